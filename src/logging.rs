//! # Tracing Module
//!
//! Environment-aware console logging using the tracing ecosystem. Logs go to
//! stdout so the host process (container, service manager) owns collection.
//!
//! - Log level from `RUST_LOG` when set, otherwise derived from the environment
//!   (`DORMHUB_ENV` / `APP_ENV`)
//! - `DORMHUB_LOG_FORMAT=json` switches to JSON lines
//! - ANSI colors only when stdout is a TTY
//!
//! Initialization is idempotent and tolerates a subscriber installed by the
//! embedding application.

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging once per process
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = std::env::var("DORMHUB_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
        let use_ansi = std::io::stdout().is_terminal();

        let console_layer = if json {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(use_ansi)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(console_layer).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                json_output = json,
                ansi_colors = use_ansi,
                "Console logging initialized"
            );
        }
    });
}

fn get_environment() -> String {
    std::env::var("DORMHUB_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" => "warn",
        _ => "debug",
    }
}

/// Log a booking status transition with the standard field set.
///
/// ```rust,ignore
/// log_transition!(info, "Transition applied",
///     booking_id: transition.booking_id.as_str(),
///     from: transition.previous_status.as_str(),
///     to: transition.new_status.as_str()
/// );
/// ```
#[macro_export]
macro_rules! log_transition {
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = %$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
}
