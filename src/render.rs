use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::bundle::{self, bundle_path, entrypoint_path};
use crate::config::Config;
use crate::constants::{
    DENO_BUNDLE_FILE, DENO_TEMPLATES_DIR, HELMIGNORE_FILE, IMPORT_TEMPLATE_FILE,
    RENDERED_TEMPLATES_FILE, TEMPLATES_DIR,
};
use crate::integrations::deno;
use crate::models::{ChartContext, RenderContext, RenderPayload, ToolOptions};
use crate::security::DenoPermissions;
use crate::validation::validate_resources;
use crate::workspace::Workspace;

pub fn is_deno_chart(chart_dir: &Path) -> bool {
    bundle_path(chart_dir).is_file() || entrypoint_path(chart_dir).is_file()
}

/// Renders a Deno chart into the workspace chart so that helm's own template pass emits it.
///
/// Charts without Deno templates are left for helm untouched.
pub fn render_deno_chart(
    config: &Config,
    context: &ChartContext,
    workspace: &Workspace,
    options: &ToolOptions,
) -> Result<()> {
    let chart_dir = workspace.chart_dir();
    if !is_deno_chart(chart_dir) {
        log::debug!("No Deno templates in chart, leaving it to helm");
        return Ok(());
    }

    let import_map_flags = deno::import_map_args(options.import_map.as_deref())?;
    let module_path = bundle::resolve(chart_dir, options.bundle_policy)?;

    let mut permissions = DenoPermissions::for_render(workspace.root(), &config.plugin_dir);
    if let Some(import_map) = &options.import_map {
        permissions.allow_read(import_map);
    }

    let payload = serde_json::to_string(&RenderPayload {
        chart_path: module_path.to_string_lossy().to_string(),
        chart_context: RenderContext {
            context,
            chart_root: chart_dir.to_string_lossy().to_string(),
        },
    })?;

    let adapter = deno::install_adapter(workspace.root())?;
    let stdout = deno::run_chart(config, &adapter, &permissions, &import_map_flags, &payload)
        .with_context(|| format!("Could not render chart {}", module_path.display()))?;

    let resources: Vec<JsonValue> = serde_json::from_str(stdout.trim())
        .context("Deno chart did not print a JSON array of resources")?;
    validate_resources(&resources)?;

    write_rendered_templates(chart_dir, &stringify_resources(&resources)?)
}

/// Joins resources into one multi-document YAML stream.
///
/// Keys are sorted, no anchors are emitted and long strings are never folded, so the
/// same resources always produce the same bytes.
pub fn stringify_resources(resources: &[JsonValue]) -> Result<String> {
    let documents = resources
        .iter()
        .map(|resource| serde_yaml::to_string(resource).context("Could not serialize resource"))
        .collect::<Result<Vec<_>>>()?;
    Ok(documents.join("---\n"))
}

fn write_rendered_templates(chart_dir: &Path, rendered: &str) -> Result<()> {
    let templates_dir = chart_dir.join(TEMPLATES_DIR);
    fs::create_dir_all(&templates_dir)
        .with_context(|| format!("Could not create {}", templates_dir.display()))?;

    fs::write(
        templates_dir.join(IMPORT_TEMPLATE_FILE),
        format!("{{{{ .Files.Get \"{RENDERED_TEMPLATES_FILE}\" }}}}"),
    )
    .context("Could not write import template")?;
    fs::write(chart_dir.join(RENDERED_TEMPLATES_FILE), rendered)
        .context("Could not write rendered templates")?;

    append_helmignore(chart_dir)
}

// Keeps the Deno sources out of what helm loads as chart files.
fn append_helmignore(chart_dir: &Path) -> Result<()> {
    let path = chart_dir.join(HELMIGNORE_FILE);
    let needs_newline = fs::read(&path)
        .map(|contents| contents.last().is_some_and(|b| *b != b'\n'))
        .unwrap_or(false);

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open {}", path.display()))?;
    if needs_newline {
        writeln!(file)?;
    }
    writeln!(file, "{DENO_BUNDLE_FILE}\n{DENO_TEMPLATES_DIR}/")?;
    Ok(())
}
