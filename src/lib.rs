//! # File Server
//! src/lib.rs
//!
//! Servidor TCP que recibe una ruta por línea y devuelve el contenido del
//! archivo. La concurrencia está acotada por un pool fijo de workers en vez
//! de un thread por conexión.
//!
//! ## Arquitectura
//!
//! ```text
//! acceptor → WorkQueue → worker-0..N → handler → cierre
//! ```
//!
//! - `dispatch`: cola FIFO compartida y pool fijo de workers
//! - `protocol`: lectura de la línea con la ruta y envío del archivo
//! - `server`: socket de escucha, acceptor y handler de conexión
//! - `metrics`: contadores y latencias
//! - `client`: cliente de carga (binario `client`)
//! - `config`, `logging`, `error`: configuración, logs y errores tipados
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let mut server = Server::new(Config::default());
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod protocol;
pub mod server;
