//! # Servidor TCP con Pool de Workers
//! src/server/tcp.rs
//!
//! El thread principal solo acepta conexiones y las encola. Un pool fijo de
//! workers las atiende, así la cantidad de threads no crece con la carga.

use crate::config::Config;
use crate::dispatch::{Dispatcher, Handler};
use crate::error::ServerError;
use crate::metrics::MetricsCollector;
use crate::server::handler::{ConnectionContext, ConnectionLimits};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pausa tras un error de `accept` que no depende del cliente (EMFILE, ENFILE...)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Servidor de archivos
pub struct Server {
    config: Config,
    metrics: MetricsCollector,
    listener: Option<TcpListener>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            metrics: MetricsCollector::new(),
            listener: None,
        }
    }

    /// Handle a las métricas (se puede consultar mientras el servidor corre)
    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }

    /// Valida la configuración y abre el socket de escucha
    ///
    /// Retorna la dirección real (útil con puerto 0).
    pub fn bind(&mut self) -> Result<SocketAddr, ServerError> {
        self.config.validate().map_err(ServerError::InvalidConfig)?;

        let listener = bind_listener(&self.config.address(), self.config.backlog)?;
        let local = listener.local_addr()?;
        info!(address = %local, "listening");

        self.listener = Some(listener);
        Ok(local)
    }

    /// Arranca los workers y acepta conexiones para siempre
    ///
    /// Solo retorna si falla el arranque.
    pub fn run(&mut self) -> Result<(), ServerError> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = match self.listener.as_ref() {
            Some(listener) => listener,
            None => return Err(io::Error::from(io::ErrorKind::NotConnected).into()),
        };

        let context = ConnectionContext {
            limits: ConnectionLimits {
                buffer_size: self.config.buffer_size,
                chunk_size: self.config.chunk_size,
            },
            metrics: self.metrics.clone(),
        };
        let handler: Handler<TcpStream> = Arc::new(move |stream: TcpStream| context.serve(stream));
        let dispatcher = Arc::new(Dispatcher::new(
            self.config.workers,
            self.config.queue_capacity,
            handler,
        )?);

        if self.config.stats_interval_secs > 0 {
            spawn_stats_reporter(
                Duration::from_secs(self.config.stats_interval_secs),
                self.metrics.clone(),
                Arc::clone(&dispatcher),
            )?;
        }

        info!("waiting for connections");
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => self.submit(&dispatcher, stream),
                Err(e) => {
                    warn!(error = %e, "failed to accept client connection");
                    let pause = accept_backoff(&e);
                    if !pause.is_zero() {
                        thread::sleep(pause);
                    }
                }
            }
        }

        Ok(())
    }

    fn submit(&self, dispatcher: &Dispatcher<TcpStream>, stream: TcpStream) {
        debug!(peer = ?stream.peer_addr().ok(), "connected");
        self.metrics.record_accepted();

        if let Err(full) = dispatcher.submit(stream) {
            self.metrics.record_rejected();
            warn!(capacity = full.capacity, "queue full, dropping connection");
            // Al soltar el stream se cierra la conexión
            drop(full.into_inner());
        }
    }
}

/// Cuánto esperar antes de volver a aceptar después de `err`
///
/// Los errores de una conexión puntual se reintentan enseguida. El resto
/// (falta de descriptores, de memoria) se repetiría en cada vuelta del loop.
fn accept_backoff(err: &io::Error) -> Duration {
    match err.kind() {
        io::ErrorKind::Interrupted
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::WouldBlock => Duration::ZERO,
        _ => ACCEPT_BACKOFF,
    }
}

/// Crea el socket de escucha con el backlog pedido
fn bind_listener(address: &str, backlog: u32) -> Result<TcpListener, ServerError> {
    let bind_error = |source: io::Error| ServerError::Bind {
        address: address.to_string(),
        source,
    };

    let addr = address
        .to_socket_addrs()
        .map_err(bind_error)?
        .next()
        .ok_or_else(|| bind_error(io::Error::new(io::ErrorKind::InvalidInput, "no address resolved")))?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(bind_error)?;
    socket.set_reuse_address(true).map_err(bind_error)?;
    socket.bind(&addr.into()).map_err(bind_error)?;
    socket.listen(backlog as i32).map_err(bind_error)?;

    Ok(socket.into())
}

/// Reporta periódicamente las métricas en el log
fn spawn_stats_reporter(
    interval: Duration,
    metrics: MetricsCollector,
    dispatcher: Arc<Dispatcher<TcpStream>>,
) -> io::Result<()> {
    thread::Builder::new()
        .name("stats-reporter".to_string())
        .spawn(move || loop {
            thread::sleep(interval);
            let snapshot = metrics.snapshot_json(&dispatcher.queue_stats());
            info!(%snapshot, "stats");
        })?;

    Ok(())
}
