//! HTTP client setup and the front-page iteration.
mod client;
mod execution;
mod iteration;
mod page;


pub use client::{HttpSettings, build_client};
pub use iteration::{IterationContext, IterationReport, run_frontpage_iteration};
pub use page::{ScriptExtractor, resolve_script_url};

pub use page::validate_base_url;
