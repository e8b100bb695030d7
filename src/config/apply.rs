use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{DEFAULT_SCENARIO_NAME, PositiveU64, PositiveUsize, RunArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue, ScenarioConfig};

/// Applies configuration values to `run` arguments and returns the name of
/// the scenario the run should report under.
///
/// Precedence is CLI flag, then the selected scenario table, then the
/// top-level config value, then the CLI default.
///
/// # Errors
///
/// Returns an error when config values are invalid or the requested scenario
/// does not exist.
pub fn apply_config(
    args: &mut RunArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<String> {
    if !is_cli(matches, "base_url")
        && let Some(url) = config.base_url.clone()
    {
        args.base_url = url;
    }

    if !is_cli(matches, "executor")
        && let Some(executor) = config.executor
    {
        args.executor = executor;
    }

    if !is_cli(matches, "vus")
        && let Some(vus) = config.vus
    {
        args.vus = ensure_positive_usize(vus, "vus")?;
    }

    if !is_cli(matches, "iterations")
        && let Some(iterations) = config.iterations
    {
        args.iterations = ensure_positive_u64(iterations, "iterations")?;
    }

    if !is_cli(matches, "max_duration")
        && let Some(value) = config.max_duration.as_ref()
    {
        args.max_duration = to_duration(value, "max_duration")?;
    }

    if !is_cli(matches, "graceful_stop")
        && let Some(value) = config.graceful_stop.as_ref()
    {
        args.graceful_stop = to_grace_duration(value, "graceful_stop")?;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(value) = config.timeout.as_ref()
    {
        args.request_timeout = to_duration(value, "timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(value) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = to_duration(value, "connect_timeout")?;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    if !is_cli(matches, "no_ua")
        && let Some(no_ua) = config.no_ua
    {
        args.no_ua = no_ua;
    }

    if !is_cli(matches, "authorized")
        && let Some(authorized) = config.authorized
    {
        args.authorized = authorized;
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = config.insecure
    {
        args.insecure = insecure;
    }

    if !is_cli(matches, "output")
        && let Some(output) = config.output
    {
        args.output = output;
    }

    let Some((name, scenario)) = select_scenario(config, args.scenario.as_deref())? else {
        return Ok(args
            .scenario
            .clone()
            .unwrap_or_else(|| DEFAULT_SCENARIO_NAME.to_owned()));
    };
    apply_scenario(args, matches, scenario)?;
    Ok(name.to_owned())
}

fn select_scenario<'cfg>(
    config: &'cfg ConfigFile,
    requested: Option<&str>,
) -> AppResult<Option<(&'cfg str, &'cfg ScenarioConfig)>> {
    let Some(scenarios) = config.scenarios.as_ref() else {
        return match requested {
            Some(name) => Err(AppError::config(ConfigError::UnknownScenario {
                name: name.to_owned(),
            })),
            None => Ok(None),
        };
    };

    if let Some(name) = requested {
        return scenarios
            .get_key_value(name)
            .map(|(key, scenario)| Some((key.as_str(), scenario)))
            .ok_or_else(|| {
                AppError::config(ConfigError::UnknownScenario {
                    name: name.to_owned(),
                })
            });
    }

    if let Some((key, scenario)) = scenarios.get_key_value(DEFAULT_SCENARIO_NAME) {
        return Ok(Some((key.as_str(), scenario)));
    }

    let mut entries = scenarios.iter();
    match (entries.next(), entries.next()) {
        (None, _) => Ok(None),
        (Some((key, scenario)), None) => Ok(Some((key.as_str(), scenario))),
        (Some(_), Some(_)) => {
            let names: Vec<&str> = scenarios.keys().map(String::as_str).collect();
            Err(AppError::config(ConfigError::AmbiguousScenario {
                names: names.join(", "),
            }))
        }
    }
}

fn apply_scenario(
    args: &mut RunArgs,
    matches: &ArgMatches,
    scenario: &ScenarioConfig,
) -> AppResult<()> {
    if !is_cli(matches, "base_url")
        && let Some(url) = scenario.base_url.clone()
    {
        args.base_url = url;
    }

    if !is_cli(matches, "executor")
        && let Some(executor) = scenario.executor
    {
        args.executor = executor;
    }

    if !is_cli(matches, "vus")
        && let Some(vus) = scenario.vus
    {
        args.vus = ensure_positive_usize(vus, "scenario.vus")?;
    }

    if !is_cli(matches, "iterations")
        && let Some(iterations) = scenario.iterations
    {
        args.iterations = ensure_positive_u64(iterations, "scenario.iterations")?;
    }

    if !is_cli(matches, "max_duration")
        && let Some(value) = scenario.max_duration.as_ref()
    {
        args.max_duration = to_duration(value, "scenario.max_duration")?;
    }

    if !is_cli(matches, "graceful_stop")
        && let Some(value) = scenario.graceful_stop.as_ref()
    {
        args.graceful_stop = to_grace_duration(value, "scenario.graceful_stop")?;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn to_duration(value: &DurationValue, field: &str) -> AppResult<std::time::Duration> {
    value.to_duration().map_err(|err| {
        AppError::config(ConfigError::InvalidDuration {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn to_grace_duration(value: &DurationValue, field: &str) -> AppResult<std::time::Duration> {
    value.to_grace_duration().map_err(|err| {
        AppError::config(ConfigError::InvalidDuration {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(headers.len());
    for header in headers {
        let pair = parse_header(header)
            .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?;
        parsed.push(pair);
    }
    Ok(parsed)
}
