//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - human readable console output
//! - optional JSON file logging with rotation
//! - `RUST_LOG` overrides the configured level
//!
//! # Example
//!
//! ```no_run
//! use mlmigrate::logging::init_logging;
//! use mlmigrate::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(experiment_id = "1", "Exporting experiment");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a command's effective options, one per line under an `Options:` header
///
/// # Example
///
/// ```no_run
/// use mlmigrate::log_options;
///
/// let experiment = "/Users/me/wine";
/// let use_threads = true;
/// log_options!(experiment, use_threads);
/// ```
#[macro_export]
macro_rules! log_options {
    ($($name:ident),+ $(,)?) => {
        tracing::info!("Options:");
        $(
            tracing::info!("  {}: {:?}", stringify!($name), $name);
        )+
    };
}

/// Log a run that was deliberately not exported
///
/// # Example
///
/// ```no_run
/// use mlmigrate::log_run_skipped;
///
/// log_run_skipped!("48cf29167ddb4e098da780f0959fb4cf", "started before run_start_time");
/// ```
#[macro_export]
macro_rules! log_run_skipped {
    ($run_id:expr, $reason:expr) => {
        tracing::info!(
            run_id = %$run_id,
            reason = %$reason,
            "Not exporting run"
        );
    };
    ($run_id:expr, $reason:expr, $($field:tt)+) => {
        tracing::info!(
            run_id = %$run_id,
            reason = %$reason,
            $($field)+,
            "Not exporting run"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use mlmigrate::log_error_with_context;
/// use mlmigrate::domain::MigrateError;
///
/// let error = MigrateError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_expand() {
        let experiment = "wine";
        let max_workers = 4;
        crate::log_options!(experiment, max_workers);
        crate::log_run_skipped!("r1", "deleted");
        crate::log_run_skipped!("r1", "too old", start_time = "2024-01-01 00:00:00");
        let err = crate::domain::MigrateError::Export("boom".to_string());
        crate::log_error_with_context!(err, "Exporting run r1");
    }
}
