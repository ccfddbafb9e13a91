use anyhow::Result;
use std::path::Path;

use crate::bundle::{bundle_path, entrypoint_path};
use crate::config::Config;
use crate::config::chart::chart_package_path;
use crate::integrations::{deno, helm};
use crate::models::{Invocation, PublishVerb, ToolOptions};
use crate::utils::remove_if_exists;

/// `push|cm-push <chart> [flags]`: bundles the chart in place, hands it to helm, then
/// removes every artifact it created, whatever helm's outcome was. A bundle the chart
/// already shipped with is published as is and left alone.
pub fn run_publish(
    config: &Config,
    options: &ToolOptions,
    invocation: &Invocation,
    verb: PublishVerb,
) -> Result<()> {
    let chart_dir = Path::new(&invocation.chart_location);
    let entrypoint = entrypoint_path(chart_dir);
    let bundle = entrypoint.is_file().then(|| bundle_path(chart_dir));
    let package = match verb {
        PublishVerb::Push => Some(chart_package_path(chart_dir)?),
        PublishVerb::CmPush => None,
    };

    let result = bundle_and_publish(
        config,
        options,
        invocation,
        verb,
        bundle.as_deref(),
        package.as_deref(),
    );

    let bundle_cleanup = bundle.as_deref().map_or(Ok(()), remove_if_exists);
    let package_cleanup = package.as_deref().map_or(Ok(()), remove_if_exists);
    let exit_code = result?;
    bundle_cleanup?;
    package_cleanup?;

    helm::exit_code_to_result(config, exit_code)
}

fn bundle_and_publish(
    config: &Config,
    options: &ToolOptions,
    invocation: &Invocation,
    verb: PublishVerb,
    bundle: Option<&Path>,
    package: Option<&Path>,
) -> Result<Option<i32>> {
    let chart_dir = Path::new(&invocation.chart_location);
    match bundle {
        Some(bundle) => {
            let entrypoint = entrypoint_path(chart_dir);
            log::debug!("Bundling {}", entrypoint.display());
            deno::bundle(config, &entrypoint, bundle, options.import_map.as_deref())?;
        }
        None => log::debug!("No Deno entry point in {}, publishing as is", chart_dir.display()),
    }

    let target = match package {
        Some(package) => {
            helm::package(config, chart_dir)?;
            package.to_string_lossy().to_string()
        }
        None => invocation.chart_location.clone(),
    };

    let args = publish_args(verb, &target, &invocation.options);
    log::debug!("Executing: {}", args.join(" "));
    helm::execute(config, &args, false)
}

/// `[verb, target, ...flags]`; `target` is the chart dir for `cm-push` and the archive for `push`.
pub fn publish_args(verb: PublishVerb, target: &str, flags: &[String]) -> Vec<String> {
    let mut args = vec![verb.as_str().to_string(), target.to_string()];
    args.extend(flags.iter().cloned());
    args
}
