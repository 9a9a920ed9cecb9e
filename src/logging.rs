use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::formatter::CustomFormatter;

/// Overrides the log file location.
pub const LOG_PATH_ENV: &str = "PACMAN_TERM_LOG";
const DEFAULT_LOG_PATH: &str = "pacman-term.log";

static SUBSCRIBER_INIT: Once = Once::new();

/// Where logs go. The terminal belongs to the game, so they never go to stdout.
pub fn log_path() -> PathBuf {
    std::env::var_os(LOG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH))
}

/// Configure and initialize logging to the log file. Only the first call has any effect.
///
/// `RUST_LOG` overrides the default of `warn` everywhere and `info` for this crate. When the log
/// file cannot be opened the game runs without logging.
pub fn setup_logging() {
    SUBSCRIBER_INIT.call_once(|| {
        let path = log_path();
        let Some(file) = open_log_file(&path) else {
            return;
        };

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}=info", env!("CARGO_CRATE_NAME"))));

        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_target(true)
            .event_format(CustomFormatter)
            .with_writer(Arc::new(file))
            .with_env_filter(filter)
            .finish()
            .with(ErrorLayer::default());

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Logging disabled, could not install the subscriber: {e}");
        }
    });
}

/// Creates the log file. Failure is reported on stderr, before the terminal is taken over.
fn open_log_file(path: &Path) -> Option<File> {
    match File::create(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Logging disabled, could not open {}: {e}", path.display());
            None
        }
    }
}
