//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing-subscriber` una sola vez al arrancar. El filtro usa la
//! sintaxis de `RUST_LOG` (por ejemplo `file_server=debug`). Los eventos van
//! a stderr; stdout queda libre para el contenido que imprime `client --print`.

use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Instala el subscriber global
///
/// Si el filtro es inválido se usa `info`. Llamarla dos veces no es un
/// error: la segunda instalación se ignora.
pub fn init(filter: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("invalid log filter {:?} ({}), falling back to info", filter, e);
        EnvFilter::new("info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .with_target(false);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {}", e);
    }
}
