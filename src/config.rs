//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor de archivos con soporte
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server --port 8080 \
//!   --workers 20 \
//!   --buffer-size 4096 \
//!   --backlog 100
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! FILE_SERVER_PORT=8080 FILE_SERVER_WORKERS=8 ./file_server
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

/// Formato de salida de los logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Texto legible para humanos
    Text,
    /// Una línea JSON por evento
    Json,
}

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor TCP que devuelve el contenido del archivo pedido, con pool fijo de workers")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "FILE_SERVER_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "FILE_SERVER_HOST")]
    pub host: String,

    // === Workers y cola ===

    /// Número de workers del pool (fijo durante toda la vida del proceso)
    #[arg(short, long, default_value = "20", env = "FILE_SERVER_WORKERS")]
    pub workers: usize,

    /// Capacidad máxima de la cola de conexiones pendientes (0 = sin límite)
    #[arg(long = "queue-capacity", default_value = "0", env = "FILE_SERVER_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    // === Socket ===

    /// Conexiones que el kernel encola antes de que las aceptemos
    #[arg(long, default_value = "100", env = "FILE_SERVER_BACKLOG")]
    pub backlog: u32,

    /// Tamaño del buffer donde se recibe la línea con la ruta
    #[arg(long = "buffer-size", default_value = "4096", env = "FILE_SERVER_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Tamaño de cada bloque al enviar el archivo
    #[arg(long = "chunk-size", default_value = "4096", env = "FILE_SERVER_CHUNK_SIZE")]
    pub chunk_size: usize,

    // === Observabilidad ===

    /// Intervalo en segundos para reportar métricas en el log (0 = desactivado)
    #[arg(long = "stats-interval-secs", default_value = "0", env = "FILE_SERVER_STATS_INTERVAL")]
    pub stats_interval_secs: u64,

    /// Filtro de logs (sintaxis de `RUST_LOG`)
    #[arg(long = "log-level", default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Formato de los logs
    #[arg(long = "log-format", value_enum, default_value = "text", env = "FILE_SERVER_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.buffer_size == 0 {
            return Err("Buffer size must be >= 1".to_string());
        }
        if self.chunk_size == 0 {
            return Err("Chunk size must be >= 1".to_string());
        }
        if self.backlog == 0 {
            return Err("Backlog must be >= 1".to_string());
        }
        if self.backlog > i32::MAX as u32 {
            return Err(format!("Backlog must be <= {}", i32::MAX));
        }

        Ok(())
    }

    /// Registra en el log un resumen de la configuración efectiva
    pub fn print_summary(&self) {
        let queue = if self.queue_capacity == 0 {
            "unbounded".to_string()
        } else {
            self.queue_capacity.to_string()
        };

        info!(address = %self.address(), backlog = self.backlog, "network");
        info!(workers = self.workers, queue = %queue, "worker pool");
        info!(
            buffer_size = self.buffer_size,
            chunk_size = self.chunk_size,
            "buffers"
        );
        if self.stats_interval_secs > 0 {
            info!(interval_secs = self.stats_interval_secs, "stats reporter enabled");
        }
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            workers: 20,
            queue_capacity: 0,
            backlog: 100,
            buffer_size: 4096,
            chunk_size: 4096,
            stats_interval_secs: 0,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Configuración del cliente de carga (`client`)
///
/// ```bash
/// ./client /tmp/testfiles/1.c
/// ./client --concurrency 50 /tmp/testfiles/1.c /tmp/testfiles/2.c
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "client")]
#[command(about = "Pide archivos al servidor y mide cuánto tarda cada respuesta")]
#[command(version = "0.1.0")]
pub struct ClientConfig {
    /// Dirección del servidor (host:port)
    #[arg(short, long, default_value = "localhost:8080", env = "FILE_SERVER_ADDR")]
    pub address: String,

    /// Rutas a pedir; con varias conexiones se reparten en ronda
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Conexiones simultáneas a abrir
    #[arg(short, long, default_value = "1", env = "FILE_SERVER_CLIENTS")]
    pub concurrency: usize,

    /// Escribir el contenido recibido en stdout
    #[arg(long)]
    pub print: bool,

    /// Filtro de logs (sintaxis de `RUST_LOG`)
    #[arg(long = "log-level", default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Formato de los logs
    #[arg(long = "log-format", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

impl ClientConfig {
    pub fn new() -> Self {
        ClientConfig::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("Concurrency must be >= 1".to_string());
        }
        Ok(())
    }
}
