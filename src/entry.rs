use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::{run_load, write_summary};
use crate::args::{CliArgs, Command, DEFAULT_SCENARIO_NAME, InspectArgs, RunArgs};
use crate::config::DEFAULT_CONFIG_FILES;
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::inspect::run_inspect;

enum RunPlan {
    Load { args: RunArgs, scenario: String },
    Inspect(InspectArgs),
}

pub(crate) fn run() -> AppResult<()> {
    let (args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    match build_plan(args, &matches)? {
        RunPlan::Load { args, scenario } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let summary = runtime.block_on(run_load(&args, scenario))?;
            let stdout = std::io::stdout();
            write_summary(&mut stdout.lock(), &summary, args.output)
        }
        RunPlan::Inspect(args) => {
            let stdout = std::io::stdout();
            run_inspect(&args, &mut stdout.lock()).map_err(AppError::inspect)
        }
    }
}

fn parse_args() -> AppResult<Option<(CliArgs, ArgMatches)>> {
    let mut cmd = CliArgs::command();
    let mut raw_args: Vec<OsString> = std::env::args_os().collect();

    if treat_as_empty(&raw_args) {
        if !has_default_config() {
            cmd.print_help()?;
            println!();
            return Ok(None);
        }
        // A config file in the working directory makes `run` the default.
        raw_args.truncate(1);
        raw_args.push(OsString::from("run"));
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = CliArgs::from_arg_matches(&matches)?;
    if args.command.is_none() {
        CliArgs::command().print_help()?;
        println!();
        return Ok(None);
    }
    Ok(Some((args, matches)))
}

fn treat_as_empty(raw_args: &[OsString]) -> bool {
    matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--")
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn build_plan(mut args: CliArgs, matches: &ArgMatches) -> AppResult<RunPlan> {
    match args.command.take() {
        Some(Command::Run(mut run_args)) => {
            let scenario = match matches.subcommand_matches("run") {
                Some(run_matches) => resolve_run_config(&mut run_args, run_matches)?,
                None => default_scenario_name(&run_args)?,
            };
            Ok(RunPlan::Load {
                args: run_args,
                scenario,
            })
        }
        Some(Command::Inspect(inspect_args)) => Ok(RunPlan::Inspect(inspect_args)),
        None => Err(AppError::validation(ValidationError::MissingCommand)),
    }
}

fn resolve_run_config(args: &mut RunArgs, matches: &ArgMatches) -> AppResult<String> {
    match crate::config::load_config(args.config.as_deref())? {
        Some(config) => crate::config::apply_config(args, matches, &config),
        None => default_scenario_name(args),
    }
}

fn default_scenario_name(args: &RunArgs) -> AppResult<String> {
    match args.scenario.as_deref() {
        None | Some(DEFAULT_SCENARIO_NAME) => Ok(DEFAULT_SCENARIO_NAME.to_owned()),
        Some(name) => {
            tracing::error!("Scenario '{}' requested but no config file was found.", name);
            Err(AppError::config(ConfigError::UnknownScenario {
                name: name.to_owned(),
            }))
        }
    }
}
