use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::constants::SUPPORTED_COMMANDS;
use crate::errors::HelmDenoError;
use crate::models::{BundlePolicy, LogLevel, ToolOptions};

/// Everything after `helm deno` is taken verbatim; wrapper flags are picked out by
/// [`parse_tool_args`] because they may appear anywhere among helm's own flags.
#[derive(Parser)]
#[command(
    name = "helm-deno",
    version,
    about = "Renders Deno-powered charts before running helm.",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

const LOG_LEVEL_FLAG: &str = "--deno-log-level";
const KEEP_TMP_CHART_FLAG: &str = "--deno-keep-tmp-chart";
const IMPORT_MAP_FLAG: &str = "--deno-import-map";
const BUNDLE_FLAG: &str = "--deno-bundle";

/// Splits argv into wrapper options and the arguments meant for helm (order preserved).
pub fn parse_tool_args(args: &[String]) -> Result<(ToolOptions, Vec<String>), HelmDenoError> {
    let mut options = ToolOptions::default();
    let mut helm_args = Vec::with_capacity(args.len());
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let (flag, inline_value) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--deno-") => (flag, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };

        match flag {
            KEEP_TMP_CHART_FLAG => {
                options.keep_tmp_chart = match inline_value.as_deref() {
                    None | Some("true") => true,
                    Some("false") => false,
                    Some(other) => {
                        return Err(HelmDenoError::InvalidOption {
                            flag: flag.to_string(),
                            reason: format!("expected true or false, got '{other}'"),
                        });
                    }
                };
            }
            LOG_LEVEL_FLAG => {
                let value = take_value(flag, inline_value, &mut iter)?;
                options.log_level = parse_choice::<LogLevel>(flag, &value)?;
            }
            BUNDLE_FLAG => {
                let value = take_value(flag, inline_value, &mut iter)?;
                options.bundle_policy = parse_choice::<BundlePolicy>(flag, &value)?;
            }
            IMPORT_MAP_FLAG => {
                let value = take_value(flag, inline_value, &mut iter)?;
                options.import_map = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            _ => helm_args.push(arg.clone()),
        }
    }

    Ok((options, helm_args))
}

fn take_value<'a>(
    flag: &str,
    inline_value: Option<String>,
    iter: &mut impl Iterator<Item = &'a String>,
) -> Result<String, HelmDenoError> {
    match inline_value {
        Some(value) => Ok(value),
        None => iter.next().cloned().ok_or_else(|| HelmDenoError::InvalidOption {
            flag: flag.to_string(),
            reason: "a value is required".to_string(),
        }),
    }
}

fn parse_choice<T: ValueEnum>(flag: &str, value: &str) -> Result<T, HelmDenoError> {
    T::from_str(value, false).map_err(|_| {
        let accepted: Vec<String> = T::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        HelmDenoError::InvalidOption {
            flag: flag.to_string(),
            reason: format!("'{}' is not one of {}", value, accepted.join(", ")),
        }
    })
}

pub fn is_help_request(args: &[String]) -> bool {
    match args.first().map(String::as_str) {
        None => true,
        Some(first) => first.is_empty() || first == "-h" || first == "--help",
    }
}

pub fn usage() -> String {
    format!(
        r#"This is a wrapper for "helm [command]". It will use Deno for rendering charts
before running "helm [command]"

Supported helm [command] is:
  - template
  - install
  - upgrade
  - push
  - diff (helm plugin)
  - secrets (helm plugin)
  - cm-push (helm plugin)

You must use the options of the supported commands in strict order:
  $ helm <secrets> <diff> [{}] [RELEASE] [CHART] <flags>

Example:
  $ helm deno upgrade <HELM UPGRADE OPTIONS>

Typical usage:
  $ helm deno upgrade ingress stable/nginx-ingress -f values.yaml
"#,
        SUPPORTED_COMMANDS.join("/")
    )
}
