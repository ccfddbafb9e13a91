pub const CHART_MANIFEST_FILE: &str = "Chart.yaml";
pub const TEMPLATES_DIR: &str = "templates";
pub const HELMIGNORE_FILE: &str = ".helmignore";

pub const DENO_TEMPLATES_DIR: &str = "deno-templates";
pub const DENO_ENTRYPOINT_FILE: &str = "deno-templates/index.ts";
pub const DENO_BUNDLE_FILE: &str = "deno-bundle.js";

pub const RENDERED_TEMPLATES_FILE: &str = "rendered-deno-templates.yaml";
pub const IMPORT_TEMPLATE_FILE: &str = "import-rendered-templates.yaml";

/// Kind of the synthetic document the probe chart renders.
pub const CHART_CONTEXT_KIND: &str = "HelmDenoChartContext";
pub const CHART_CONTEXT_TEMPLATE_FILE: &str = "helm-deno-chart-context.yaml";

/// Subdirectories of a workspace holding copies of the user's chart.
pub const WORKSPACE_CHART_DIR: &str = "chart";
pub const WORKSPACE_PROBE_DIR: &str = "probe";
pub const WORKSPACE_FETCH_DIR: &str = "fetch";

/// Replaces the workspace path in errors about charts fetched from a repository.
pub const REMOTE_CHART_PLACEHOLDER: &str = "<chart-root>";

pub const HELM_BIN_ENV: &str = "HELM_BIN";
pub const HELM_PLUGIN_DIR_ENV: &str = "HELM_PLUGIN_DIR";

pub const SECRETS_COMMAND: &str = "secrets";
pub const DIFF_COMMAND: &str = "diff";
pub const PUSH_COMMAND: &str = "push";
pub const CM_PUSH_COMMAND: &str = "cm-push";
pub const SUPPORTED_COMMANDS: [&str; 3] = ["upgrade", "template", "install"];
