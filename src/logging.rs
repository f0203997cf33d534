use std::backtrace::Backtrace;
use std::panic::PanicHookInfo;

use tracing_subscriber::{EnvFilter, fmt};

pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    // Panics must land in the log stream, not stderr.
    std::panic::set_hook(Box::new(log_panic));
}

fn log_panic(info: &PanicHookInfo<'_>) {
    let message = if let Some(message) = info.payload().downcast_ref::<&str>() {
        *message
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    };

    let backtrace = Backtrace::capture();
    let location = info
        .location()
        .map(|loc| loc.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::error!(panic = %message, %location, backtrace = %backtrace, "panic");
}
