//! # File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor de archivos: parsea la configuración,
//! inicializa el logging y acepta conexiones para siempre.

use file_server::config::Config;
use file_server::logging;
use file_server::server::Server;
use tracing::error;

fn main() {
    // Crear configuración (CLI o variables de entorno)
    let config = Config::new();
    logging::init(&config.log_level, config.log_format);

    config.print_summary();

    let mut server = Server::new(config);

    // Iniciar el servidor (esto bloqueará el thread)
    if let Err(e) = server.run() {
        error!(error = %e, "💥 Error fatal");
        std::process::exit(1);
    }
}
