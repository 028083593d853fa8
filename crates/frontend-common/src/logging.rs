//! Browser console logging

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_web::MakeWebConsoleWriter;

/// Route `tracing` events to the browser console
///
/// Installed with `set_global_default` so `wasm_logger` can still take the
/// `log` facade used by dependencies. A second call is a no-op.
pub fn init(level: Level) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(fmt_layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
