mod app;
mod args;
mod config;
mod entry;
mod error;
mod executor;
mod http;
mod inspect;
mod logger;
mod metrics;
mod shutdown;

#[cfg(test)]
mod test_support;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
