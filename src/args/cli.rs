use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::time::Duration;

use super::defaults::{DEFAULT_BASE_URL, DEFAULT_ITERATIONS, DEFAULT_VUS};
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_filter, parse_grace_arg, parse_header, parse_positive_u64,
    parse_positive_usize,
};
use super::types::{ExecutorKind, InspectMode, OutputFormat, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Operational tooling for the orange link-sharing site: replay front-page load and inspect state snapshots."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose logging (sets log level to debug unless overridden by ORANGE_LOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env, global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the front-page load scenario
    Run(RunArgs),
    /// Query a state snapshot with the REPL helpers
    Inspect(InspectArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Page fetched by every iteration; script sources are appended to it
    #[arg(long = "base-url", short = 'u', default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// How iterations are distributed across virtual users
    #[arg(long, value_enum, default_value = "shared-iterations")]
    pub executor: ExecutorKind,

    /// Number of concurrent virtual users
    #[arg(long, default_value = DEFAULT_VUS, value_parser = parse_positive_usize)]
    pub vus: PositiveUsize,

    /// Iterations in total (shared-iterations) or per VU (per-vu-iterations)
    #[arg(long, short = 'i', default_value = DEFAULT_ITERATIONS, value_parser = parse_positive_u64)]
    pub iterations: PositiveU64,

    /// Abort the run after this long (supports ms/s/m/h)
    #[arg(
        long = "max-duration",
        default_value = "10m",
        value_parser = parse_duration_arg
    )]
    pub max_duration: Duration,

    /// Time in-flight iterations get to finish once the run is stopping (0 abandons them)
    #[arg(
        long = "graceful-stop",
        default_value = "30s",
        value_parser = parse_grace_arg
    )]
    pub graceful_stop: Duration,

    /// Request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = "10s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long, short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Disable the default User-Agent header (orange-load/<version>); requires --authorized
    #[arg(long = "no-ua")]
    pub no_ua: bool,

    /// Confirm you have authorization to run tests when disabling the default User-Agent
    #[arg(long = "authorized")]
    pub authorized: bool,

    /// Skip TLS certificate and hostname verification
    #[arg(long)]
    pub insecure: bool,

    /// Scenario to pick from the config file
    #[arg(long)]
    pub scenario: Option<String>,

    /// Path to config file (TOML/JSON). Defaults to ./orange-load.toml or ./orange-load.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Summary format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    /// JSON state snapshot shaped {"content": {"Submissions": [...]}}
    #[arg(long, required_unless_present = "help_topic")]
    pub state: Option<String>,

    /// Keep submissions whose KEY equals VALUE (repeatable, all must match)
    #[arg(long = "where", short = 'w', value_parser = parse_filter)]
    pub filters: Vec<(String, Value)>,

    /// Print only this field of each matching submission
    #[arg(long)]
    pub select: Option<String>,

    /// Print the value at a dotted path instead (e.g. content.Submissions.0.Title)
    #[arg(long, conflicts_with_all = ["filters", "select"])]
    pub path: Option<String>,

    /// Output mode
    #[arg(long, value_enum, default_value = "inspect")]
    pub mode: InspectMode,

    /// List the helpers, or describe one by name
    #[arg(long = "help-topic", num_args = 0..=1, default_missing_value = "")]
    pub help_topic: Option<String>,
}
