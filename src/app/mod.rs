mod runner;
mod summary;

pub(crate) use runner::run_load;
pub(crate) use summary::write_summary;
