//! # Cliente de Carga - Entry Point
//! src/bin/client.rs
//!
//! ```bash
//! ./client /tmp/testfiles/1.c > /dev/null
//! ./client -c 100 /tmp/testfiles/1.c /tmp/testfiles/2.c
//! ```

use file_server::client::{fetch_many, LoadSummary};
use file_server::config::ClientConfig;
use file_server::logging;
use std::io::{self, Write};
use std::time::Instant;
use tracing::{error, info, warn};

fn main() {
    let config = ClientConfig::new();
    logging::init(&config.log_level, config.log_format);

    if let Err(e) = config.validate() {
        error!(error = %e, "💥 Configuración inválida");
        std::process::exit(2);
    }

    info!(
        address = %config.address,
        connections = config.concurrency,
        "starting clients"
    );

    let start = Instant::now();
    let results = fetch_many(&config.address, &config.paths, config.concurrency);
    let total = start.elapsed();

    let mut stdout = io::stdout().lock();
    for result in &results {
        match result {
            Ok(fetched) => {
                info!(
                    path = %fetched.path.display(),
                    bytes = fetched.bytes(),
                    elapsed_ms = fetched.elapsed.as_secs_f64() * 1000.0,
                    "elapsed"
                );
                if fetched.body.is_empty() {
                    warn!(path = %fetched.path.display(), "empty reply (missing or unreadable file?)");
                }
                if config.print {
                    if let Err(e) = stdout.write_all(&fetched.body) {
                        error!(error = %e, "failed writing to stdout");
                    }
                }
            }
            Err(e) => error!(error = %e, "request failed"),
        }
    }

    let summary = LoadSummary::from_results(&results);
    info!(
        requests = summary.requests,
        succeeded = summary.succeeded,
        failed = summary.failed,
        empty = summary.empty,
        bytes = summary.bytes,
        fastest_ms = summary.fastest_ms,
        slowest_ms = summary.slowest_ms,
        total_ms = total.as_secs_f64() * 1000.0,
        "done"
    );

    if summary.failed > 0 {
        std::process::exit(1);
    }
}
