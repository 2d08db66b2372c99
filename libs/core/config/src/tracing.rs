use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset in development.
const DEV_FILTER: &str = "info,domain_lending=debug,lendit_demo=debug";

/// Default filter when `RUST_LOG` is unset in production.
const PROD_FILTER: &str = "warn,domain_lending=info";

/// Install color-eyre for binaries. Safe to call more than once.
///
/// Shows the file:line where an error was raised and hides the environment
/// section.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize tracing for the given environment.
///
/// - **Production**: flattened JSON events without targets.
/// - **Development**: pretty, human-readable output.
///
/// Both install `tracing_error::ErrorLayer` so span traces are captured when
/// errors are reported through color-eyre. `RUST_LOG` overrides the default
/// filter.
///
/// Calling this again after a subscriber is installed is a no-op, which
/// keeps tests that share a process from panicking.
pub fn init_tracing(environment: &Environment) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new(PROD_FILTER)
        } else {
            EnvFilter::new(DEV_FILTER)
        }
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(()) => info!(?environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}
