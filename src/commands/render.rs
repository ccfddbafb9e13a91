use anyhow::Result;

use crate::config::Config;
use crate::context;
use crate::errors::normalize_error_paths;
use crate::integrations::helm;
use crate::models::{ChartOrigin, Invocation, ToolOptions};
use crate::render::render_deno_chart;
use crate::workspace::Workspace;

/// `[secrets] [diff] template|install|upgrade <release> <chart> [flags]`.
///
/// Renders the chart inside a fresh workspace, then runs the original helm command against
/// the rendered copy. The workspace is torn down on every path unless it should be kept, and
/// temp paths in errors are mapped back to the chart the user named.
pub fn run_render(config: &Config, options: &ToolOptions, invocation: &Invocation) -> Result<()> {
    let workspace = Workspace::create(options.keep_tmp_chart)?;
    let origin = ChartOrigin::detect(&invocation.chart_location);

    let result =
        render_and_execute(config, options, invocation, &workspace, &origin).map_err(|err| {
            if workspace.keep() {
                err
            } else {
                normalize_error_paths(err, workspace.root(), &origin)
            }
        });

    let teardown = workspace.teardown();
    result?;
    teardown
}

fn render_and_execute(
    config: &Config,
    options: &ToolOptions,
    invocation: &Invocation,
    workspace: &Workspace,
    origin: &ChartOrigin,
) -> Result<()> {
    workspace.provision(
        config,
        origin,
        &invocation.chart_location,
        &invocation.options,
    )?;

    let chart_context = context::extract(config, workspace, invocation)?;
    log::debug!(
        "Chart context:\n{}",
        serde_json::to_string_pretty(&chart_context)?
    );

    render_deno_chart(config, &chart_context, workspace, options)?;
    log::debug!("Deno templates were successfully rendered");

    let args = delegated_args(invocation, &workspace.chart_dir().to_string_lossy());
    log::debug!("Executing: {}", args.join(" "));
    helm::execute(config, &args, true)?;

    log::debug!("Success");
    Ok(())
}

/// `[...command, release?, chart, ...options]`; an empty release name is left out.
pub fn delegated_args(invocation: &Invocation, chart_dir: &str) -> Vec<String> {
    let mut args = invocation.command.clone();
    if !invocation.release_name.is_empty() {
        args.push(invocation.release_name.clone());
    }
    args.push(chart_dir.to_string());
    args.extend(invocation.options.iter().cloned());
    args
}
