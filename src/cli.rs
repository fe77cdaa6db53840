//! CLI argument parsing for the feature harvester.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "feature-harvest",
    version,
    about = "Harvest API test-case metadata from Cucumber feature files in GitLab",
    after_help = "Commands:\n  run --scenarios <file>                       Harvest every configured test case into CSV\n  parse --feature <file> --scenario <id>       Resolve one test case from a local feature file\n  resolve --uri <template>                     Resolve a URI template against params\n\nEnvironment:\n  GITLAB_URL    GitLab base URL (overridden by --gitlab-url)\n  GITLAB_TOKEN  Private access token (overridden by --token)\n  RUST_LOG      Log filter, e.g. feature_harvest=debug\n\nExamples:\n  feature-harvest run --scenarios api_with_scenarios.json --output-dir out\n  feature-harvest parse --feature 1234.feature --scenario TC01 --json\n  feature-harvest resolve --uri '/users/{id}?taxYear={taxYear}' --uri-params id=42 --query-params taxYear=2022",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunArgs),
    Parse(ParseArgs),
    Resolve(ResolveArgs),
}

/// Batch harvest inputs.
#[derive(Parser, Debug)]
#[command(about = "Harvest every configured test case into CSV")]
pub struct RunArgs {
    /// JSON (or .yml/.yaml) list of {api_number, sc_no} entries
    #[arg(long, value_name = "FILE")]
    pub scenarios: PathBuf,

    /// Optional JSON run config
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitLab base URL
    #[arg(long, value_name = "URL")]
    pub gitlab_url: Option<String>,

    /// GitLab private access token
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Branch to read files from
    #[arg(long)]
    pub branch: Option<String>,

    /// Root of the output tree
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Pause after each project search, in milliseconds
    #[arg(long, value_name = "MS")]
    pub throttle_ms: Option<u64>,

    /// Stop at the first test case that fails to parse
    #[arg(long)]
    pub fail_fast: bool,

    /// Emit the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Offline parse of one feature file.
#[derive(Parser, Debug)]
#[command(about = "Resolve one test case from a local feature file")]
pub struct ParseArgs {
    #[arg(long, value_name = "FILE")]
    pub feature: PathBuf,

    /// Examples row id (tcNo), matched case-insensitively
    #[arg(long, value_name = "ID")]
    pub scenario: String,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Offline URI template resolution.
#[derive(Parser, Debug)]
#[command(about = "Resolve a URI template against uri and query params")]
pub struct ResolveArgs {
    #[arg(long, value_name = "TEMPLATE")]
    pub uri: String,

    /// `key=value,key=value` or `none`
    #[arg(long, value_name = "PARAMS", default_value = "none")]
    pub uri_params: String,

    /// `key=value,key=value` or `none`
    #[arg(long, value_name = "PARAMS", default_value = "none")]
    pub query_params: String,
}
