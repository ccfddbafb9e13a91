use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::{REMOTE_CHART_PLACEHOLDER, WORKSPACE_CHART_DIR, WORKSPACE_PROBE_DIR};
use crate::models::ChartOrigin;

#[derive(Debug, Error)]
pub enum HelmDenoError {
    #[error("Bundle for chart does not exist")]
    BundleMissing,

    #[error("Could not find import map {}", .0.display())]
    ImportMapMissing(PathBuf),

    #[error("`{command}` requires {missing}")]
    MissingArgument {
        command: String,
        missing: &'static str,
    },

    #[error(
        "Expected exactly one chart directory after fetching {chart} into {}, found {found}",
        dir.display()
    )]
    AmbiguousFetch {
        chart: String,
        dir: PathBuf,
        found: usize,
    },

    #[error("helm did not render the {kind} document for chart {chart}")]
    ChartContextMissing { kind: String, chart: String },

    #[error("helm rendered {count} {kind} documents for chart {chart}, expected exactly one")]
    ChartContextDuplicated {
        kind: String,
        chart: String,
        count: usize,
    },

    #[error("Could not decode {field} from the chart context document: {reason}")]
    ChartContextInvalid { field: &'static str, reason: String },

    #[error("Bad manifest: kind={kind}, name={name}, namespace={namespace}")]
    BadManifest {
        kind: String,
        name: String,
        namespace: String,
    },

    #[error("Invalid value for {flag}: {reason}")]
    InvalidOption { flag: String, reason: String },

    /// A child failed and its captured stderr is the useful part of the report.
    #[error("{stderr}")]
    ProcessFailed { program: String, stderr: String },

    /// A child failed after reporting on its own; the wrapper mirrors its exit code.
    #[error("{program} exited with code {code}")]
    ChildExited { program: String, code: i32 },
}

/// Rewrites workspace paths in the error so they point at something the user recognizes.
///
/// Both chart copies (the working chart and the probe) map to the chart the user named;
/// any other workspace file is shown relative to the workspace. `ChildExited` passes
/// through untouched so its exit code survives.
pub fn normalize_error_paths(
    err: anyhow::Error,
    workspace_root: &Path,
    origin: &ChartOrigin,
) -> anyhow::Error {
    if matches!(
        err.downcast_ref::<HelmDenoError>(),
        Some(HelmDenoError::ChildExited { .. })
    ) {
        return err;
    }

    let message = format!("{err:#}");
    anyhow::anyhow!(replace_workspace_paths(&message, workspace_root, origin))
}

pub fn replace_workspace_paths(message: &str, workspace_root: &Path, origin: &ChartOrigin) -> String {
    let chart = match origin {
        ChartOrigin::Local(location) => location.as_str(),
        ChartOrigin::Remote => REMOTE_CHART_PLACEHOLDER,
    };

    let mut message = message.to_string();
    for dir in [WORKSPACE_CHART_DIR, WORKSPACE_PROBE_DIR] {
        let dir = workspace_root.join(dir);
        let dir = dir.to_string_lossy();
        message = message
            .replace(&format!("file://{dir}"), chart)
            .replace(dir.as_ref(), chart);
    }

    let root = format!("{}/", workspace_root.to_string_lossy().trim_end_matches('/'));
    message
        .replace(&format!("file://{root}"), "")
        .replace(&root, "")
}

/// Exit code the wrapper should finish with for a failed run.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<HelmDenoError>() {
        Some(HelmDenoError::ChildExited { code, .. }) => *code,
        _ => 1,
    }
}
