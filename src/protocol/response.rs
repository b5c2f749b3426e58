//! # Envío de la Respuesta
//! src/protocol/response.rs
//!
//! La respuesta son los bytes crudos del archivo, sin headers ni largo. El
//! cliente sabe que terminó cuando el servidor cierra la conexión.

use crate::error::ServeError;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::trace;

/// Copia `file` a `writer` en bloques de `chunk_size` bytes
///
/// Cada bloque se escribe completo (`write_all` reintenta escrituras
/// parciales). Cualquier error duro aborta la transferencia.
///
/// Retorna el total de bytes enviados.
pub fn send_file<F, W>(
    file: &mut F,
    path: &Path,
    writer: &mut W,
    chunk_size: usize,
) -> Result<u64, ServeError>
where
    F: Read,
    W: Write,
{
    let mut chunk = vec![0u8; chunk_size];
    let mut total = 0u64;

    loop {
        let n = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(ServeError::ReadFile {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        writer
            .write_all(&chunk[..n])
            .map_err(ServeError::WriteResponse)?;
        total += n as u64;
        trace!(bytes = n, "sent chunk");
    }

    writer.flush().map_err(ServeError::WriteResponse)?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Writer que acepta como mucho 3 bytes por llamada
    struct ShortWriter(Vec<u8>);

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(3);
            self.0.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Writer que falla después de `limit` bytes
    struct FailingWriter {
        written: usize,
        limit: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written >= self.limit {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            let n = buf.len().min(self.limit - self.written);
            self.written += n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Archivo cuya primera lectura es interrumpida por una señal
    struct InterruptedOnce {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_send_whole_file_in_chunks() {
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut file = Cursor::new(content.clone());
        let mut out = Vec::new();

        let sent = send_file(&mut file, Path::new("/data"), &mut out, 4096).unwrap();

        assert_eq!(sent, content.len() as u64);
        assert_eq!(out, content);
    }

    #[test]
    fn test_short_writes_are_completed() {
        let mut file = Cursor::new(b"hello short writes".to_vec());
        let mut out = ShortWriter(Vec::new());

        let sent = send_file(&mut file, Path::new("/x"), &mut out, 8).unwrap();

        assert_eq!(sent, 18);
        assert_eq!(out.0, b"hello short writes");
    }

    #[test]
    fn test_write_error_aborts() {
        let mut file = Cursor::new(vec![0u8; 1000]);
        let mut out = FailingWriter {
            written: 0,
            limit: 100,
        };

        let err = send_file(&mut file, Path::new("/x"), &mut out, 64).unwrap_err();
        assert_eq!(err.kind(), "write_response");
        assert_eq!(out.written, 100);
    }

    #[test]
    fn test_interrupted_read_does_not_abort() {
        let content: Vec<u8> = (0..300u32).map(|i| (i % 7) as u8).collect();
        let mut file = InterruptedOnce {
            interrupted: false,
            inner: Cursor::new(content.clone()),
        };
        let mut out = Vec::new();

        let sent = send_file(&mut file, Path::new("/slow"), &mut out, 128).unwrap();

        assert!(file.interrupted);
        assert_eq!(sent, 300);
        assert_eq!(out, content);
    }

    #[test]
    fn test_empty_file_sends_nothing() {
        let mut file = Cursor::new(Vec::new());
        let mut out = Vec::new();
        assert_eq!(send_file(&mut file, Path::new("/empty"), &mut out, 4096).unwrap(), 0);
        assert!(out.is_empty());
    }
}
