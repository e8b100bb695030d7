use std::path::Path;

use serde_json::Value;

use crate::error::InspectError;

/// State the helpers operate on. Mirrors what the site exposes to its
/// console: `{"content": {"Submissions": [...]}, ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplContext {
    state: Value,
}

impl ReplContext {
    #[must_use]
    pub const fn new(state: Value) -> Self {
        Self { state }
    }

    /// Reads a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not JSON.
    pub fn load(path: &Path) -> Result<Self, InspectError> {
        let content = std::fs::read_to_string(path).map_err(|err| InspectError::ReadState {
            path: path.to_path_buf(),
            source: err,
        })?;
        let state = serde_json::from_str(&content).map_err(|err| InspectError::ParseState {
            path: path.to_path_buf(),
            source: err,
        })?;
        tracing::debug!("Loaded state snapshot {}", path.display());
        Ok(Self { state })
    }

    #[must_use]
    pub const fn state(&self) -> &Value {
        &self.state
    }
}
