use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// A routed helm invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Vec<String>,
    pub release_name: String,
    pub chart_location: String,
    pub options: Vec<String>,
}

impl Invocation {
    pub fn uses_secrets(&self) -> bool {
        self.command
            .first()
            .is_some_and(|c| c == crate::constants::SECRETS_COMMAND)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishVerb {
    /// `helm push`: package the chart and push the archive to an OCI registry.
    Push,
    /// `helm cm-push`: push the chart directory to a ChartMuseum repository.
    CmPush,
}

impl PublishVerb {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            crate::constants::PUSH_COMMAND => Some(Self::Push),
            crate::constants::CM_PUSH_COMMAND => Some(Self::CmPush),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => crate::constants::PUSH_COMMAND,
            Self::CmPush => crate::constants::CM_PUSH_COMMAND,
        }
    }
}

/// Where the chart comes from, which decides how its temp path is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOrigin {
    /// A directory containing `Chart.yaml`, as the user wrote it.
    Local(String),
    /// Anything helm has to fetch.
    Remote,
}

impl ChartOrigin {
    pub fn detect(chart_location: &str) -> Self {
        if crate::config::chart::is_local_chart(std::path::Path::new(chart_location)) {
            Self::Local(chart_location.to_string())
        } else {
            Self::Remote
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Log only important
    #[default]
    Info,
    /// Log everything
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundlePolicy {
    /// Do not use prebundled code
    #[default]
    Ignore,
    /// Require chart to be prebundled, fail otherwise
    Require,
    /// Use deno-bundle.js if it exists
    Prefer,
}

/// Wrapper flags stripped from argv before anything reaches helm.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolOptions {
    pub log_level: LogLevel,
    pub keep_tmp_chart: bool,
    pub import_map: Option<PathBuf>,
    pub bundle_policy: BundlePolicy,
}

/// `.Release` exactly as helm's `toYaml` prints it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HelmRelease {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub is_install: bool,
    #[serde(default)]
    pub is_upgrade: bool,
    #[serde(default)]
    pub revision: i64,
    #[serde(default)]
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseMetadata {
    pub name: String,
    pub namespace: String,
    pub is_install: bool,
    pub is_upgrade: bool,
    pub revision: i64,
    pub service: String,
}

impl From<HelmRelease> for ReleaseMetadata {
    fn from(r: HelmRelease) -> Self {
        Self {
            name: r.name,
            namespace: r.namespace,
            is_install: r.is_install,
            is_upgrade: r.is_upgrade,
            revision: r.revision,
            service: r.service,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartContext {
    pub release: ReleaseMetadata,
    pub values: JsonValue,
}

/// What the Deno adapter receives on stdin.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPayload<'a> {
    pub chart_path: String,
    pub chart_context: RenderContext<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext<'a> {
    #[serde(flatten)]
    pub context: &'a ChartContext,
    pub chart_root: String,
}

/// Only the `Chart.yaml` fields the wrapper reads.
#[derive(Debug, Deserialize)]
pub struct ChartMetadata {
    pub name: String,
    pub version: String,
}
