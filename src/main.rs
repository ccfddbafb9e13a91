//! helm-deno
//! A helm plugin that renders charts written as Deno modules, then hands the result to helm.
//!

mod args;
mod bundle;
mod cli;
mod commands;
mod config;
mod constants;
mod context;
mod errors;
mod integrations;
mod models;
mod process;
mod render;
mod security;
mod utils;
mod validation;
mod workspace;

use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use args::Route;
use cli::Cli;
use commands::{publish::run_publish, render::run_render};
use config::Config;
use errors::{HelmDenoError, exit_code_for};
use integrations::helm;
use models::{LogLevel, ToolOptions};

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli.args) {
        // helm already reported its own failure
        if !matches!(
            err.downcast_ref::<HelmDenoError>(),
            Some(HelmDenoError::ChildExited { .. })
        ) {
            eprintln!("Error: {err:#}");
        }
        std::process::exit(exit_code_for(&err));
    }
}

fn run(raw_args: &[String]) -> Result<()> {
    let (options, helm_args) = cli::parse_tool_args(raw_args)?;
    init_logging(options.log_level);

    if cli::is_help_request(&helm_args) {
        print!("{}", cli::usage());
        return Ok(());
    }

    let config = Config::from_env()?;
    log::debug!("Options: {}", serde_json::to_string(&options)?);
    log::debug!("Helm binary: {}", config.helm_bin.display());

    dispatch(&config, &options, &helm_args)
}

fn dispatch(config: &Config, options: &ToolOptions, helm_args: &[String]) -> Result<()> {
    match args::route(helm_args)? {
        Route::Publish(verb, invocation) => {
            log::debug!("Publishing chart {} with {}", invocation.chart_location, verb.as_str());
            run_publish(config, options, &invocation, verb)
        }
        Route::Render(invocation) => {
            log::debug!("Invocation: {invocation:?}");
            run_render(config, options, &invocation)
        }
        Route::PassThrough => {
            log::debug!("Passing through to helm: {}", helm_args.join(" "));
            helm::execute(config, helm_args, true).map(|_| ())
        }
    }
}

fn init_logging(level: LogLevel) {
    let filter = match level {
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    };
    let started = Instant::now();

    env_logger::Builder::from_default_env()
        .filter_level(filter)
        .format(move |buf, record| {
            writeln!(
                buf,
                "[{} ms] {}",
                started.elapsed().as_millis(),
                record.args()
            )
        })
        .init();
}
