//! # Errores del Servidor
//! src/error.rs
//!
//! Tipos de error tipados. Los errores por conexión (`ServeError`) nunca
//! salen del worker; solo los de arranque (`ServerError`) terminan el proceso.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error al atender una conexión concreta
///
/// El cliente nunca ve estos errores: solo observa que la conexión se cierra.
#[derive(Debug, Error)]
pub enum ServeError {
    /// El cliente cerró (o falló) antes de mandar un solo byte
    #[error("empty request: peer sent no data")]
    EmptyRequest,

    #[error("failed to read request: {0}")]
    ReadRequest(#[source] io::Error),

    #[error("bad path {path:?}: {source}")]
    ResolvePath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("open error {path:?}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed reading {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write response: {0}")]
    WriteResponse(#[source] io::Error),
}

impl ServeError {
    /// Etiqueta corta y estable, usada como clave en las métricas
    pub fn kind(&self) -> &'static str {
        match self {
            ServeError::EmptyRequest => "empty_request",
            ServeError::ReadRequest(_) => "read_request",
            ServeError::ResolvePath { .. } => "resolve_path",
            ServeError::OpenFile { .. } => "open_file",
            ServeError::ReadFile { .. } => "read_file",
            ServeError::WriteResponse(_) => "write_response",
        }
    }
}

/// La cola llena rechazó el elemento; se devuelve al llamador
#[derive(Debug, Error)]
#[error("queue is full (max capacity: {capacity})")]
pub struct QueueFull<T> {
    pub item: T,
    pub capacity: usize,
}

impl<T> QueueFull<T> {
    /// Recupera el elemento rechazado
    pub fn into_inner(self) -> T {
        self.item
    }
}

/// Errores fatales de arranque
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errores del cliente de carga
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to send request: {0}")]
    Send(#[source] io::Error),

    #[error("failed to read reply: {0}")]
    Receive(#[source] io::Error),

    #[error("client thread panicked")]
    Panicked,
}
