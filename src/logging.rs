use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber, writing to `log_file`.
///
/// The filter comes from `MONEYFLOW_LOG`, then `default_filter`. Logging
/// never goes to the terminal since the TUI owns it. If the file cannot be
/// opened, logging stays off.
pub(crate) fn init_tracing(log_file: &Path, default_filter: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("MONEYFLOW_LOG")
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("moneyflow=info"));

        let file = match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
        {
            Ok(file) => file,
            Err(e) => {
                eprintln!("Warning: cannot open log file {}: {e}", log_file.display());
                return;
            }
        };

        let _ = fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    });
}
