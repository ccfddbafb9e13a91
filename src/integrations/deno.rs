use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::errors::HelmDenoError;
use crate::process::{RunOptions, run};
use crate::security::DenoPermissions;

/// Loads a chart module, calls its default export with the chart context read from stdin and
/// prints the returned resources as JSON.
const IMPORT_CHART_ADAPTER: &str = include_str!("../../deno/import-chart.ts");
const IMPORT_CHART_FILE: &str = "import-chart.ts";

const V8_FLAGS: &str = "--v8-flags=--max-old-space-size=256";

/// Checks the configured import map and turns it into deno flags.
pub fn import_map_args(import_map: Option<&Path>) -> Result<Vec<String>> {
    let Some(import_map) = import_map else {
        return Ok(vec![]);
    };

    if !import_map.exists() {
        return Err(HelmDenoError::ImportMapMissing(import_map.to_path_buf()).into());
    }

    Ok(vec![
        "--import-map".to_string(),
        import_map.to_string_lossy().to_string(),
    ])
}

/// Writes the adapter entry point into the workspace and returns its path.
pub fn install_adapter(workspace_root: &Path) -> Result<PathBuf> {
    let path = workspace_root.join(IMPORT_CHART_FILE);
    fs::write(&path, IMPORT_CHART_ADAPTER)
        .with_context(|| format!("Could not write {}", path.display()))?;
    Ok(path)
}

/// Runs `adapter` under `permissions` with `payload` on stdin and returns what it printed.
pub fn run_chart(
    config: &Config,
    adapter: &Path,
    permissions: &DenoPermissions,
    import_map_flags: &[String],
    payload: &str,
) -> Result<String> {
    let mut args = vec!["run".to_string(), V8_FLAGS.to_string(), "--quiet".to_string()];
    args.extend(permissions.to_deno_args());
    args.extend_from_slice(import_map_flags);
    args.push(adapter.to_string_lossy().to_string());

    let output = run(
        &config.deno_bin(),
        &args,
        RunOptions::capture().with_stdin(payload.as_bytes()),
    )?;
    Ok(output.stdout)
}

/// `deno bundle` of the chart entry point into a single file.
pub fn bundle(
    config: &Config,
    entrypoint: &Path,
    bundle_path: &Path,
    import_map: Option<&Path>,
) -> Result<()> {
    let mut args = vec!["bundle".to_string(), "--quiet".to_string()];
    args.extend(import_map_args(import_map)?);
    args.push(entrypoint.to_string_lossy().to_string());
    args.push(bundle_path.to_string_lossy().to_string());

    run(&config.deno_bin(), &args, RunOptions::capture())
        .with_context(|| format!("Could not bundle {}", entrypoint.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_no_import_map_no_flags() {
        assert!(import_map_args(None).unwrap().is_empty());
    }

    #[test]
    fn test_existing_import_map() {
        let dir = tempdir().unwrap();
        let map = dir.path().join("import_map.json");
        fs::write(&map, "{}").unwrap();

        assert_eq!(
            import_map_args(Some(&map)).unwrap(),
            vec!["--import-map".to_string(), map.to_string_lossy().to_string()]
        );
    }

    #[test]
    fn test_missing_import_map_is_reported() {
        let err = import_map_args(Some(Path::new("/nope/import_map.json"))).unwrap_err();
        assert_eq!(err.to_string(), "Could not find import map /nope/import_map.json");
    }

    #[test]
    fn test_adapter_is_written_to_workspace() {
        let dir = tempdir().unwrap();
        let path = install_adapter(dir.path()).unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("chartContext"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_chart_sends_payload_on_stdin() {
        use std::os::unix::fs::PermissionsExt;

        let plugin_dir = tempdir().unwrap();
        let bin = plugin_dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        let deno = bin.join("deno");
        fs::write(&deno, "#!/bin/sh\ncat\n").unwrap();
        fs::set_permissions(&deno, fs::Permissions::from_mode(0o755)).unwrap();

        let config = Config {
            helm_bin: PathBuf::from("helm"),
            plugin_dir: plugin_dir.path().to_path_buf(),
        };
        let stdout = run_chart(
            &config,
            Path::new("/w/import-chart.ts"),
            &DenoPermissions::default(),
            &[],
            "{\"chartPath\":\"x\"}",
        )
        .unwrap();

        assert_eq!(stdout, "{\"chartPath\":\"x\"}");
    }
}
