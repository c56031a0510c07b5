//! Tracing subscriber setup from [`LoggingConfig`].
//!
//! Hosts that already install their own subscriber can ignore this module;
//! every event the crate emits goes through `tracing` regardless.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::LoggingError;

/// Build a stderr fmt subscriber, plain or JSON, filtered by
/// `config.filter`.
pub fn subscriber(config: &LoggingConfig) -> Result<Box<dyn Subscriber + Send + Sync>, LoggingError> {
    let filter = EnvFilter::try_new(&config.filter)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if config.json {
        Ok(Box::new(builder.json().finish()))
    } else {
        Ok(Box::new(builder.finish()))
    }
}

/// Install [`subscriber`] as the global default.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    tracing::subscriber::set_global_default(subscriber(config)?)?;
    Ok(())
}
