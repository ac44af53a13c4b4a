//! Message framing
//!
//! Every outbound record is terminated by a single CRLF. Payloads are treated
//! as opaque bytes; any CR/LF bytes the caller left at either end are trimmed
//! before the delimiter is appended, so writing an already-delimited payload
//! never produces a doubled delimiter.

use bytes::{BufMut, BytesMut};

/// Frame delimiter appended to every outbound record (CR LF)
pub const FRAME_DELIMITER: &[u8] = b"\r\n";

/// Strip leading and trailing delimiter bytes from a payload.
///
/// Trims the CR/LF byte-set from both ends (matching the wire behavior
/// log collectors expect), not just one exact trailing sequence.
fn trim_delimiter(payload: &[u8]) -> &[u8] {
    let start = payload
        .iter()
        .position(|b| !FRAME_DELIMITER.contains(b))
        .unwrap_or(payload.len());
    let end = payload
        .iter()
        .rposition(|b| !FRAME_DELIMITER.contains(b))
        .map_or(start, |i| i + 1);
    &payload[start..end]
}

/// Assemble the wire frame for a payload: trimmed payload + one CRLF.
pub fn frame(payload: &[u8]) -> BytesMut {
    let trimmed = trim_delimiter(payload);
    let mut buf = BytesMut::with_capacity(trimmed.len() + FRAME_DELIMITER.len());
    buf.put(trimmed);
    buf.put(FRAME_DELIMITER);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_appends_delimiter() {
        let framed = frame(b"hello");
        assert_eq!(&framed[..], b"hello\r\n");
    }

    #[test]
    fn test_frame_idempotent_for_delimited_payload() {
        let framed = frame(b"hello\r\n");
        assert_eq!(&framed[..], b"hello\r\n");
    }

    #[test]
    fn test_frame_trims_leading_delimiter_bytes() {
        let framed = frame(b"\r\nhello");
        assert_eq!(&framed[..], b"hello\r\n");
    }

    #[test]
    fn test_frame_trims_bare_newline() {
        // Trimming operates on the delimiter byte-set, so a lone LF goes too.
        let framed = frame(b"hello\n");
        assert_eq!(&framed[..], b"hello\r\n");
    }

    #[test]
    fn test_frame_preserves_interior_delimiter() {
        let framed = frame(b"hello\r\nworld");
        assert_eq!(&framed[..], b"hello\r\nworld\r\n");
    }

    #[test]
    fn test_frame_empty_payload() {
        let framed = frame(b"");
        assert_eq!(&framed[..], b"\r\n");
    }

    #[test]
    fn test_frame_delimiter_only_payload() {
        let framed = frame(b"\r\n\r\n");
        assert_eq!(&framed[..], b"\r\n");
    }

    #[test]
    fn test_frame_length() {
        let payload = b"some log record";
        let framed = frame(payload);
        assert_eq!(framed.len(), payload.len() + FRAME_DELIMITER.len());
    }
}
