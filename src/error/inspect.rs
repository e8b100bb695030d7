use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Failed to read state snapshot '{path}': {source}")]
    ReadState {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse state snapshot '{path}': {source}")]
    ParseState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid filter '{value}'. Expected 'key=value'.")]
    InvalidFilter { value: String },
    #[error("No helper named '{name}'. Try `inspect --help-topic` for the full list.")]
    UnknownHelper { name: String },
    #[error("Nothing found at path '{path}'.")]
    PathNotFound { path: String },
    #[error("Failed to write output: {source}")]
    Output {
        #[from]
        source: std::io::Error,
    },
    #[error("Failed to encode output: {source}")]
    Encode {
        #[from]
        source: serde_json::Error,
    },
}
