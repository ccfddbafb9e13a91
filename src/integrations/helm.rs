use anyhow::{Context, Result};
use std::path::Path;

use crate::args::fetch_args;
use crate::config::Config;
use crate::errors::HelmDenoError;
use crate::process::{ProcessOutput, RunOptions, run};

/// `helm fetch <chart> --untar --untardir <dir>` with the user's repository flags.
pub fn fetch(
    config: &Config,
    chart_location: &str,
    destination: &Path,
    helm_options: &[String],
) -> Result<()> {
    let mut args = vec![
        "fetch".to_string(),
        chart_location.to_string(),
        "--untar".to_string(),
        "--untardir".to_string(),
        destination.to_string_lossy().to_string(),
    ];
    args.extend(fetch_args(helm_options));

    run(&config.helm_bin, &args, RunOptions::capture())
        .with_context(|| format!("Could not fetch chart {chart_location}"))?;
    Ok(())
}

/// Renders a chart and returns helm's stdout.
pub fn template(config: &Config, args: &[String]) -> Result<String> {
    let output = run(&config.helm_bin, args, RunOptions::capture())?;
    Ok(output.stdout)
}

/// Runs helm with the caller's terminal attached.
///
/// With `auto_exit_on_failure` a failure unwinds as [`HelmDenoError::ChildExited`];
/// otherwise the exit code of a failed run is returned.
pub fn execute(config: &Config, args: &[String], auto_exit_on_failure: bool) -> Result<Option<i32>> {
    let options = if auto_exit_on_failure {
        RunOptions::inherit().auto_exit()
    } else {
        RunOptions::inherit()
    };

    let ProcessOutput {
        success, exit_code, ..
    } = run(&config.helm_bin, args, options)?;
    Ok((!success).then_some(exit_code))
}

/// Turns a non-zero exit code from [`execute`] into the error `main` mirrors.
pub fn exit_code_to_result(config: &Config, exit_code: Option<i32>) -> Result<()> {
    match exit_code {
        Some(code) => Err(HelmDenoError::ChildExited {
            program: config.helm_bin.display().to_string(),
            code,
        }
        .into()),
        None => Ok(()),
    }
}

/// `helm package <chart> --destination <chart>`.
pub fn package(config: &Config, chart_dir: &Path) -> Result<()> {
    let chart = chart_dir.to_string_lossy().to_string();
    let args = ["package".to_string(), chart.clone(), "--destination".to_string(), chart];

    run(&config.helm_bin, &args, RunOptions::capture())
        .with_context(|| format!("Could not package chart {}", chart_dir.display()))?;
    Ok(())
}
