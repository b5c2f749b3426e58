//! # Lectura del Request
//! src/protocol/request.rs
//!
//! ## Formato
//!
//! ```text
//! /tmp/testfiles/1.c\n
//! ```
//!
//! Una sola línea con la ruta. El request termina en el primer `\n` o cuando
//! se llena el buffer de recepción, lo que ocurra primero. No hay más framing.

use crate::error::ServeError;
use std::ffi::OsStr;
use std::io::{self, Read};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Request recibido: los bytes de la ruta, sin el `\n` final
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    raw: Vec<u8>,

    /// `true` si se llenó el buffer antes de ver un `\n`
    truncated: bool,
}

impl PathRequest {
    /// Construye un request a partir de los bytes ya leídos
    ///
    /// Corta en el primer `\n`, si lo hay.
    pub fn from_bytes(bytes: &[u8], truncated: bool) -> Self {
        let line = match bytes.iter().position(|&b| b == b'\n') {
            Some(pos) => &bytes[..pos],
            None => bytes,
        };

        Self {
            raw: line.to_vec(),
            truncated,
        }
    }

    /// La ruta tal cual la mandó el cliente (sin validar)
    pub fn path(&self) -> &Path {
        Path::new(OsStr::from_bytes(&self.raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Lee la línea del request desde `reader`
///
/// Lee en un buffer de `capacity` bytes hasta ver un `\n` o llenarlo. Si el
/// buffer se llena sin `\n`, su contenido completo es la ruta (truncada).
///
/// # Errores
///
/// * `ServeError::EmptyRequest` - el peer cerró sin mandar nada
/// * `ServeError::ReadRequest` - falló la lectura del socket
pub fn read_request<R: Read>(reader: &mut R, capacity: usize) -> Result<PathRequest, ServeError> {
    let mut buf = vec![0u8; capacity];
    let mut len = 0;

    while len < capacity {
        match reader.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(n) => {
                let start = len;
                len += n;
                if buf[start..len].contains(&b'\n') {
                    return Ok(PathRequest::from_bytes(&buf[..len], false));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ServeError::ReadRequest(e)),
        }
    }

    if len == 0 {
        return Err(ServeError::EmptyRequest);
    }

    Ok(PathRequest::from_bytes(&buf[..len], len == capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader que entrega los datos de a un byte, como un socket lento
    struct Trickle<'a>(&'a [u8]);

    impl<'a> Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let data: &'a [u8] = self.0;
            match data.split_first() {
                Some((first, rest)) if !buf.is_empty() => {
                    buf[0] = *first;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    /// Reader que siempre falla
    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::ConnectionReset))
        }
    }

    /// Reader que falla una vez con `Interrupted` (una señal) y luego entrega `inner`
    struct InterruptedOnce<R> {
        interrupted: bool,
        inner: R,
    }

    impl<R: Read> Read for InterruptedOnce<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_simple_request() {
        let mut input = Cursor::new(b"/tmp/testfiles/1.c\n".to_vec());
        let request = read_request(&mut input, 4096).unwrap();

        assert_eq!(request.path(), Path::new("/tmp/testfiles/1.c"));
        assert!(!request.is_truncated());
    }

    #[test]
    fn test_request_split_across_reads() {
        let mut input = Trickle(b"/etc/hostname\n");
        let request = read_request(&mut input, 4096).unwrap();
        assert_eq!(request.as_bytes(), b"/etc/hostname");
    }

    #[test]
    fn test_stops_at_first_newline() {
        let mut input = Cursor::new(b"/a\n/b\n".to_vec());
        let request = read_request(&mut input, 4096).unwrap();
        assert_eq!(request.as_bytes(), b"/a");
    }

    #[test]
    fn test_only_newline_is_empty_path() {
        let mut input = Cursor::new(b"\n".to_vec());
        let request = read_request(&mut input, 4096).unwrap();
        assert!(request.as_bytes().is_empty());
    }

    #[test]
    fn test_eof_without_newline() {
        let mut input = Cursor::new(b"/etc/hosts".to_vec());
        let request = read_request(&mut input, 4096).unwrap();
        assert_eq!(request.as_bytes(), b"/etc/hosts");
        assert!(!request.is_truncated());
    }

    #[test]
    fn test_truncated_at_capacity() {
        let long = vec![b'a'; 100];
        let mut input = Cursor::new(long);
        let request = read_request(&mut input, 16).unwrap();

        assert_eq!(request.as_bytes(), &[b'a'; 16][..]);
        assert!(request.is_truncated());
    }

    #[test]
    fn test_empty_request() {
        let mut input = Cursor::new(Vec::new());
        let err = read_request(&mut input, 4096).unwrap_err();
        assert!(matches!(err, ServeError::EmptyRequest));
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let mut input = InterruptedOnce {
            interrupted: false,
            inner: Cursor::new(b"/tmp/testfiles/2.c\n".to_vec()),
        };
        let request = read_request(&mut input, 4096).unwrap();

        assert!(input.interrupted);
        assert_eq!(request.as_bytes(), b"/tmp/testfiles/2.c");
        assert!(!request.is_truncated());
    }

    #[test]
    fn test_read_error() {
        let err = read_request(&mut Broken, 4096).unwrap_err();
        assert_eq!(err.kind(), "read_request");
    }

    #[test]
    fn test_non_utf8_path_is_kept() {
        let mut input = Cursor::new(b"/tmp/\xff\xfe\n".to_vec());
        let request = read_request(&mut input, 4096).unwrap();
        assert_eq!(request.as_bytes(), b"/tmp/\xff\xfe");
    }
}
