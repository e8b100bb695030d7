//! Snapshot inspection with the REPL helpers.
//!
//! The helpers read from an explicit [`ReplContext`] loaded from a JSON
//! snapshot instead of a process-wide global.
mod context;
mod help;
mod helpers;
mod query;


pub use context::ReplContext;
pub use help::{HelpEntry, HelpRegistry};
pub use helpers::{Predicate, is, lookup, prop, submissions};
pub use query::run_inspect;
