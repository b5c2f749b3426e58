//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes y las encola
//! 3. Deja que el pool de workers lea la ruta pedida
//! 4. Envía el archivo y cierra la conexión

pub mod handler;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use handler::{handle_connection, ConnectionContext, ConnectionLimits};
pub use tcp::Server;
