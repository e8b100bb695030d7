//! Core library for the `orange-load` CLI.
//!
//! Exposes the pieces the binary is assembled from: CLI argument types,
//! configuration loading, the front-page iteration and its HTTP client, the
//! virtual-user executors, metrics aggregation, and the snapshot helpers used
//! by `orange-load inspect`. The command-line application is the primary
//! interface; library APIs may change with it.
pub mod args;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod inspect;
pub mod metrics;
pub mod shutdown;

#[cfg(test)]
mod test_support;
