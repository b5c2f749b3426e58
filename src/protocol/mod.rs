//! # Protocolo de Archivos
//! src/protocol/mod.rs
//!
//! ```text
//! cliente: /ruta/al/archivo\n
//! servidor: <bytes del archivo> y cierra
//! ```
//!
//! Si algo falla, el servidor cierra sin mandar nada. No hay códigos de
//! error en el cable.

pub mod request;
pub mod response;

// Re-exportar para facilitar el uso
pub use request::{read_request, PathRequest};
pub use response::send_file;
