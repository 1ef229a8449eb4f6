use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

/// Install color-eyre for startup error reports.
///
/// Call before any fallible work in `main`. Safe to call more than once.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Output format of the global subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// One flattened JSON object per event
    Json,
    /// Multi-line human-readable output
    Pretty,
}

impl LogFormat {
    pub fn for_environment(environment: &Environment) -> Self {
        if environment.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }

    /// Filter used when `RUST_LOG` is unset.
    fn default_directives(self) -> &'static str {
        match self {
            LogFormat::Json => "info,sqlx=warn,sea_orm=warn,hyper=warn",
            LogFormat::Pretty => "debug,hyper=info,sqlx=info,handlebars=info",
        }
    }

    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        match self {
            LogFormat::Json => fmt::layer()
                .json()
                .with_target(false)
                .flatten_event(true)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .pretty()
                .boxed(),
        }
    }
}

/// Initialize the global subscriber for `environment`.
///
/// Carries an `ErrorLayer` so eyre reports include span traces. Repeated
/// calls are ignored.
pub fn init_tracing(environment: &Environment) {
    let format = LogFormat::for_environment(environment);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format.default_directives()));

    let result = tracing_subscriber::registry()
        .with(format.layer())
        .with(tracing_error::ErrorLayer::default())
        .with(filter)
        .try_init();

    match result {
        Ok(()) => info!(?environment, ?format, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}
