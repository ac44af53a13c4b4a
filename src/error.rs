//! Error types for logwire

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the connection and framing layer
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying socket I/O failure (dial or write)
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration (empty host, zero port, bad PEM, TLS over UDP, ...)
    #[error("configuration error: {0}")]
    Config(String),

    /// TLS handshake or certificate failure
    #[error("TLS error: {0}")]
    Tls(String),

    /// Write deadline exceeded
    #[error("write timed out after {0:?}")]
    WriteTimeout(Duration),

    /// Write attempted after `close`
    #[error("connection closed")]
    ConnectionClosed,

    /// Invalid state transition (internal invariant violation)
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },
}

impl Error {
    /// Whether this error indicates the peer went away mid-write.
    ///
    /// Classification is structural (`io::ErrorKind::BrokenPipe`) rather
    /// than substring matching on the formatted message. Connection resets
    /// and timeouts are deliberately excluded: only a broken pipe triggers
    /// the redial path.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_pipe_classified() {
        let err = Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        assert!(err.is_broken_pipe());
    }

    #[test]
    fn test_reset_not_classified_as_broken_pipe() {
        let err = Error::Io(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ));
        assert!(!err.is_broken_pipe());
    }

    #[test]
    fn test_timeout_not_classified_as_broken_pipe() {
        let err = Error::WriteTimeout(Duration::from_secs(30));
        assert!(!err.is_broken_pipe());
    }

    #[test]
    fn test_message_text_does_not_affect_classification() {
        // A non-pipe error whose message happens to mention "broken pipe"
        // must not be misclassified.
        let err = Error::Io(io::Error::other("looks like a broken pipe"));
        assert!(!err.is_broken_pipe());
    }

    #[test]
    fn test_display_connection_closed() {
        assert_eq!(Error::ConnectionClosed.to_string(), "connection closed");
    }
}
