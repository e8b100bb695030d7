//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::{CliArgs, Command, InspectArgs, RunArgs};
pub use types::{ExecutorKind, InspectMode, OutputFormat, PositiveU64, PositiveUsize};

pub(crate) use defaults::{DEFAULT_SCENARIO_NAME, DEFAULT_USER_AGENT};
pub(crate) use parsers::{parse_duration_value, parse_grace_value, parse_header};
