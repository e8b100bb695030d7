use clap::Parser;

use crate::error::{AppError, AppResult};

use super::{CliArgs, Command, InspectArgs, RunArgs};

pub(crate) fn parse_test_args<I, T>(args: I) -> AppResult<CliArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliArgs::try_parse_from(args).map_err(AppError::from)
}

pub(crate) fn parse_run_args(extra: &[&str]) -> AppResult<RunArgs> {
    let argv = ["orange-load", "run"].iter().chain(extra.iter()).copied();
    match parse_test_args(argv)?.command {
        Some(Command::Run(run)) => Ok(run),
        _ => Err(AppError::validation("Expected the run subcommand")),
    }
}

pub(crate) fn parse_inspect_args(extra: &[&str]) -> AppResult<InspectArgs> {
    let argv = ["orange-load", "inspect"].iter().chain(extra.iter()).copied();
    match parse_test_args(argv)?.command {
        Some(Command::Inspect(inspect)) => Ok(inspect),
        _ => Err(AppError::validation("Expected the inspect subcommand")),
    }
}
