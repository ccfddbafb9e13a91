//! Routing of helm argv and the flag allowlists used for helm sub-invocations.

use crate::constants::{DIFF_COMMAND, SECRETS_COMMAND, SUPPORTED_COMMANDS};
use crate::errors::HelmDenoError;
use crate::models::{Invocation, PublishVerb};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `push`/`cm-push`: bundle the chart in place and publish it.
    Publish(PublishVerb, Invocation),
    /// `[secrets] [diff] template|install|upgrade`: render in a workspace, then run helm.
    Render(Invocation),
    /// Anything else goes to helm verbatim.
    PassThrough,
}

pub fn route(args: &[String]) -> Result<Route, HelmDenoError> {
    if let Some(verb) = args.first().and_then(|a| PublishVerb::from_token(a)) {
        let chart_location = args.get(1).cloned().ok_or(HelmDenoError::MissingArgument {
            command: verb.as_str().to_string(),
            missing: "a chart",
        })?;
        return Ok(Route::Publish(
            verb,
            Invocation {
                command: vec![verb.as_str().to_string()],
                release_name: String::new(),
                chart_location,
                options: args[2..].to_vec(),
            },
        ));
    }

    let mut rest = args;
    let mut command = Vec::new();
    for prefix in [SECRETS_COMMAND, DIFF_COMMAND] {
        if let Some((first, tail)) = rest.split_first() {
            if first == prefix {
                command.push(first.clone());
                rest = tail;
            }
        }
    }

    match rest.split_first() {
        Some((verb, tail)) if SUPPORTED_COMMANDS.contains(&verb.as_str()) => {
            command.push(verb.clone());
            let (release_name, chart_location) = match tail {
                [release, chart, ..] => (release.clone(), chart.clone()),
                _ => {
                    return Err(HelmDenoError::MissingArgument {
                        command: command.join(" "),
                        missing: "a release name and a chart",
                    });
                }
            };
            Ok(Route::Render(Invocation {
                command,
                release_name,
                chart_location,
                options: tail[2..].to_vec(),
            }))
        }
        _ => Ok(Route::PassThrough),
    }
}

const TEMPLATE_VALUE_FLAGS: [&str; 5] = ["--set", "--values", "-f", "--set-file", "--set-string"];

const FETCH_VALUE_FLAGS: [&str; 11] = [
    "--ca-file",
    "--cert-file",
    "--key-file",
    "--keyring",
    "--password",
    "--repo",
    "--username",
    "--version",
    "--registry-config",
    "--repository-cache",
    "--repository-config",
];

const FETCH_BOOL_FLAGS: [&str; 3] = ["--devel", "--insecure-skip-tls-verify", "--verify"];

/// Flags that influence value computation; everything else is dropped for the probe render.
pub fn template_value_args(args: &[String]) -> Vec<String> {
    select_flags(args, &TEMPLATE_VALUE_FLAGS, &[])
}

/// Flags `helm fetch` understands, taken from the user's install/upgrade/template flags.
pub fn fetch_args(args: &[String]) -> Vec<String> {
    select_flags(args, &FETCH_VALUE_FLAGS, &FETCH_BOOL_FLAGS)
}

fn select_flags(args: &[String], value_flags: &[&str], bool_flags: &[&str]) -> Vec<String> {
    let mut selected = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let flag = arg.split_once('=').map_or(arg.as_str(), |(flag, _)| flag);
        let has_inline_value = flag.len() != arg.len();

        if value_flags.contains(&flag) {
            selected.push(arg.clone());
            if !has_inline_value {
                if let Some(value) = iter.next() {
                    selected.push(value.clone());
                }
            }
        } else if bool_flags.contains(&flag) {
            selected.push(arg.clone());
        }
    }

    selected
}
