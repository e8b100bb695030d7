pub(crate) const DEFAULT_USER_AGENT: &str = concat!("orange-load/", env!("CARGO_PKG_VERSION"));

/// Front page hit by every iteration unless overridden.
pub(crate) const DEFAULT_BASE_URL: &str = "https://orange.decode.ee";

pub(crate) const DEFAULT_SCENARIO_NAME: &str = "frontpage";
pub(crate) const DEFAULT_VUS: &str = "1000";
pub(crate) const DEFAULT_ITERATIONS: &str = "10000";
