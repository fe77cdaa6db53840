use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

mod api_def;
mod cli;
mod config;
mod error;
mod feature;
mod gitlab;
mod layout;
mod output;
mod params;
mod uri;
mod workflow;

use cli::{Command, ParseArgs, ResolveArgs, RootArgs, RunArgs};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Run(args) => cmd_run(args),
        Command::Parse(args) => cmd_parse(args),
        Command::Resolve(args) => cmd_resolve(args),
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let run_config = config::load_run_config(args.config.as_deref())?;
    let overrides = config::Overrides {
        gitlab_url: args.gitlab_url,
        token: args.token,
        branch: args.branch,
        output_dir: args.output_dir,
        throttle_ms: args.throttle_ms,
    };
    let settings = config::resolve_settings(run_config, overrides, |key| std::env::var(key).ok())?;
    let scenarios = config::load_scenarios(&args.scenarios)?;
    tracing::info!(
        count = scenarios.len(),
        output_dir = %settings.output_dir.display(),
        branch = %settings.branch,
        "starting harvest"
    );

    let start = Instant::now();
    let client = gitlab::GitlabClient::new(&settings);
    let harvester = workflow::Harvester::new(
        &client,
        layout::OutputLayout::new(settings.output_dir.clone()),
        settings.corp_marker.clone(),
    );
    let summary = harvester.run(&scenarios, args.fail_fast)?;
    tracing::info!(
        processed = summary.processed,
        written = summary.written,
        failed = summary.failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "harvest complete"
    );

    if args.json {
        let text = serde_json::to_string_pretty(&summary).context("serialize run summary")?;
        println!("{text}");
    } else {
        println!(
            "processed: {}\nwritten: {}\nmissing repos: {}\nskipped: {}\nfailed: {}",
            summary.processed,
            summary.written,
            summary.missing_repos,
            summary.skipped,
            summary.failed
        );
        for failure in &summary.failures {
            println!("  {} {}: {}", failure.api_number, failure.sc_no, failure.error);
        }
    }
    Ok(())
}

fn cmd_parse(args: ParseArgs) -> Result<()> {
    let details = feature::parse_file(&args.feature, &args.scenario)?;
    if args.json {
        let text = serde_json::to_string_pretty(&details).context("serialize scenario")?;
        println!("{text}");
        return Ok(());
    }
    for (name, value) in details.fields() {
        if let Some(value) = value {
            println!("{name}: {value}");
        }
    }
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> Result<()> {
    let uri_params = params::decode(&args.uri_params).context("decode --uri-params")?;
    let query_params = params::decode(&args.query_params).context("decode --query-params")?;
    println!("{}", uri::resolve(&args.uri, &uri_params, &query_params));
    Ok(())
}
