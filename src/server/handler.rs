//! # Handler de Conexión
//! src/server/handler.rs
//!
//! Lo que ejecuta un worker sobre cada conexión:
//!
//! 1. Leer la línea con la ruta
//! 2. Resolverla (`canonicalize`)
//! 3. Abrir el archivo
//! 4. Enviarlo en bloques
//! 5. Cerrar archivo y conexión
//!
//! Todos los caminos terminan cerrando la conexión: el stream se recibe por
//! valor y se libera al salir de `handle_connection`, con o sin error.

use crate::error::ServeError;
use crate::metrics::MetricsCollector;
use crate::protocol::{read_request, send_file};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// Tamaños de buffer usados por el handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    /// Capacidad del buffer para la línea del request
    pub buffer_size: usize,

    /// Tamaño de cada bloque enviado
    pub chunk_size: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            buffer_size: 4096,
            chunk_size: 4096,
        }
    }
}

/// Atiende una conexión de principio a fin
///
/// Retorna los bytes enviados. Los errores son solo informativos: el cliente
/// nunca recibe nada más que el cierre de la conexión.
pub fn handle_connection<S>(mut stream: S, limits: &ConnectionLimits) -> Result<u64, ServeError>
where
    S: Read + Write,
{
    let request = read_request(&mut stream, limits.buffer_size)?;
    let requested = request.path();

    if request.is_truncated() {
        warn!(limit = limits.buffer_size, "request filled the buffer without newline, path truncated");
    }
    info!(path = %requested.display(), "request");

    let resolved = fs::canonicalize(requested).map_err(|source| ServeError::ResolvePath {
        path: requested.to_path_buf(),
        source,
    })?;

    let mut file = File::open(&resolved).map_err(|source| ServeError::OpenFile {
        path: resolved.clone(),
        source,
    })?;

    send_file(&mut file, &resolved, &mut stream, limits.chunk_size)
}

/// Contexto compartido por todos los workers
#[derive(Clone)]
pub struct ConnectionContext {
    pub limits: ConnectionLimits,
    pub metrics: MetricsCollector,
}

impl ConnectionContext {
    /// Atiende un socket aceptado y registra el resultado en las métricas
    ///
    /// Nunca falla: los errores se registran y la conexión se cierra.
    pub fn serve(&self, stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let _span = info_span!("conn", %peer).entered();

        let start = Instant::now();
        self.metrics.connection_started();

        match handle_connection(stream, &self.limits) {
            Ok(bytes) => {
                self.metrics.record_served(bytes, start.elapsed());
                info!(bytes, "closing connection");
            }
            Err(e) => {
                self.metrics.record_failed(e.kind(), start.elapsed());
                match e {
                    ServeError::EmptyRequest => debug!("peer closed without a request"),
                    other => warn!(error = %other, "closing connection without response"),
                }
            }
        }
    }
}
