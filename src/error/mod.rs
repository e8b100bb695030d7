mod app;
mod config;
mod http;
mod inspect;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use inspect::InspectError;
pub use validation::ValidationError;
