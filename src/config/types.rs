use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{ExecutorKind, OutputFormat, parse_duration_value, parse_grace_value};
use crate::error::ValidationError;

/// Top-level config file. Values here apply to every scenario; a selected
/// `[scenarios.<name>]` table overrides them.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub executor: Option<ExecutorKind>,
    pub vus: Option<usize>,
    pub iterations: Option<u64>,
    pub max_duration: Option<DurationValue>,
    pub graceful_stop: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub headers: Option<Vec<String>>,
    pub no_ua: Option<bool>,
    pub authorized: Option<bool>,
    pub insecure: Option<bool>,
    pub output: Option<OutputFormat>,
    pub scenarios: Option<BTreeMap<String, ScenarioConfig>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ScenarioConfig {
    pub executor: Option<ExecutorKind>,
    pub vus: Option<usize>,
    pub iterations: Option<u64>,
    pub max_duration: Option<DurationValue>,
    pub graceful_stop: Option<DurationValue>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }

    /// Same as [`DurationValue::to_duration`], except that zero is allowed.
    pub(crate) fn to_grace_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_grace_value(text),
        }
    }
}
