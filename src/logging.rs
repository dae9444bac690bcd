//! Process-wide logging setup for the `schema-refresh` binary.
//!
//! `RUST_LOG` takes precedence over the configured `logging.level`. Records emitted through the
//! `log` facade are forwarded to `tracing`.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

use crate::config::schema::LoggingConfig;

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber. Only the first call has an effect.
pub fn init_logging(config: &LoggingConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        if config.level.eq_ignore_ascii_case("off") {
            return;
        }

        let fmt_layer = if config.json {
            fmt::layer().json().with_writer(std::io::stderr).boxed()
        } else {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed()
        };
        let subscriber = tracing_subscriber::registry()
            .with(fmt_layer)
            .with(env_filter(config));

        // A `log` logger may already be installed by the embedding application
        tracing_log::LogTracer::init().ok();

        if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("schema-refresh: failed to initialize logging: {error}");
        }
    });
}
