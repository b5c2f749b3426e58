//! # Cliente de Carga
//! src/client.rs
//!
//! Abre una conexión por archivo pedido, manda `<ruta>\n` y lee hasta que el
//! servidor cierra. Con varias conexiones simultáneas sirve para ver cómo el
//! pool drena la cola: con más clientes que workers, los últimos tardan más.

use crate::error::ClientError;
use serde::Serialize;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Una respuesta completa del servidor
#[derive(Debug, Clone)]
pub struct Fetch {
    pub path: PathBuf,
    pub body: Vec<u8>,

    /// Desde el connect hasta el cierre del servidor
    pub elapsed: Duration,
}

impl Fetch {
    pub fn bytes(&self) -> u64 {
        self.body.len() as u64
    }
}

/// Pide un archivo y espera la respuesta completa
///
/// Una respuesta vacía no es un error: es lo que manda el servidor cuando la
/// ruta no existe o no se puede abrir.
pub fn fetch(address: &str, path: &Path) -> Result<Fetch, ClientError> {
    let start = Instant::now();

    let mut stream = TcpStream::connect(address).map_err(|source| ClientError::Connect {
        address: address.to_string(),
        source,
    })?;

    let mut line = path.as_os_str().as_bytes().to_vec();
    line.push(b'\n');
    stream.write_all(&line).map_err(ClientError::Send)?;

    let mut body = Vec::new();
    stream.read_to_end(&mut body).map_err(ClientError::Receive)?;

    let elapsed = start.elapsed();
    debug!(path = %path.display(), bytes = body.len(), ?elapsed, "fetched");

    Ok(Fetch {
        path: path.to_path_buf(),
        body,
        elapsed,
    })
}

/// Lanza `clients` conexiones a la vez; la conexión `i` pide `paths[i % len]`
///
/// Los resultados vuelven en el orden de las conexiones.
pub fn fetch_many(
    address: &str,
    paths: &[PathBuf],
    clients: usize,
) -> Vec<Result<Fetch, ClientError>> {
    if paths.is_empty() {
        return Vec::new();
    }

    thread::scope(|scope| {
        let handles: Vec<_> = (0..clients)
            .map(|i| {
                let path = &paths[i % paths.len()];
                scope.spawn(move || fetch(address, path))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(ClientError::Panicked)))
            .collect()
    })
}

/// Resumen de una corrida
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSummary {
    pub requests: usize,
    pub succeeded: usize,
    pub failed: usize,

    /// Respuestas sin un solo byte (archivo inexistente o ilegible)
    pub empty: usize,
    pub bytes: u64,
    pub fastest_ms: f64,
    pub slowest_ms: f64,
}

impl LoadSummary {
    pub fn from_results(results: &[Result<Fetch, ClientError>]) -> Self {
        let fetched: Vec<&Fetch> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let millis = |d: Duration| d.as_secs_f64() * 1000.0;

        Self {
            requests: results.len(),
            succeeded: fetched.len(),
            failed: results.len() - fetched.len(),
            empty: fetched.iter().filter(|f| f.body.is_empty()).count(),
            bytes: fetched.iter().map(|f| f.bytes()).sum(),
            fastest_ms: fetched.iter().map(|f| millis(f.elapsed)).fold(f64::NAN, f64::min),
            slowest_ms: fetched.iter().map(|f| millis(f.elapsed)).fold(f64::NAN, f64::max),
        }
    }
}
