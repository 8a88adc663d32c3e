use std::io::Cursor;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Size of the length header in front of every body.
pub const HEADER_LEN: usize = 4;

/// Largest body a peer may announce. Anything bigger is a protocol violation.
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Not enough data buffered yet to hold a complete frame.
    #[error("stream ended early")]
    Incomplete,

    #[error("frame of {0} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    TooLarge(usize),
}

/// Checks whether a whole frame can be read from `src`.
///
/// On success the cursor is left positioned just past the frame, so the
/// caller knows how many bytes to consume.
pub fn check(src: &mut Cursor<&[u8]>) -> Result<(), FrameError> {
    let len = get_len(src)?;
    skip(src, len)
}

/// Reads one frame body. Call only after [`check`] succeeded.
pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Bytes, FrameError> {
    let len = get_len(src)?;

    if src.remaining() < len {
        return Err(FrameError::Incomplete);
    }

    let body = Bytes::copy_from_slice(&src.chunk()[..len]);
    src.advance(len);

    Ok(body)
}

/// Prefixes `body` with its length header.
pub fn encode(body: &[u8]) -> Result<Bytes, FrameError> {
    if body.len() > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(body.len()));
    }

    let mut buf = BytesMut::with_capacity(HEADER_LEN + body.len());
    // Fits: MAX_FRAME_LEN is far below u32::MAX.
    buf.put_u32(body.len() as u32);
    buf.put_slice(body);

    Ok(buf.freeze())
}

fn get_len(src: &mut Cursor<&[u8]>) -> Result<usize, FrameError> {
    if src.remaining() < HEADER_LEN {
        return Err(FrameError::Incomplete);
    }

    let len = src.get_u32() as usize;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }

    Ok(len)
}

fn skip(src: &mut Cursor<&[u8]>, n: usize) -> Result<(), FrameError> {
    if src.remaining() < n {
        return Err(FrameError::Incomplete);
    }

    src.advance(n);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_frame() {
        let framed = encode(br#"{"operation":"SELECT"}"#).unwrap();
        let mut cursor = Cursor::new(&framed[..]);

        check(&mut cursor).unwrap();
        assert_eq!(cursor.position() as usize, framed.len());

        cursor.set_position(0);
        assert_eq!(&parse(&mut cursor).unwrap()[..], br#"{"operation":"SELECT"}"#);
    }

    #[test]
    fn partial_header_and_partial_body_are_incomplete() {
        let framed = encode(b"hello").unwrap();

        assert_eq!(check(&mut Cursor::new(&framed[..2])), Err(FrameError::Incomplete));
        assert_eq!(check(&mut Cursor::new(&framed[..6])), Err(FrameError::Incomplete));
    }

    #[test]
    fn back_to_back_frames_are_read_one_at_a_time() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode(b"first").unwrap());
        buf.extend_from_slice(&encode(b"second").unwrap());

        let mut cursor = Cursor::new(&buf[..]);
        assert_eq!(&parse(&mut cursor).unwrap()[..], b"first");
        assert_eq!(&parse(&mut cursor).unwrap()[..], b"second");
        assert_eq!(parse(&mut cursor), Err(FrameError::Incomplete));
    }

    #[test]
    fn empty_bodies_are_valid_frames() {
        let framed = encode(b"").unwrap();
        assert_eq!(framed.len(), HEADER_LEN);
        assert!(parse(&mut Cursor::new(&framed[..])).unwrap().is_empty());
    }

    #[test]
    fn oversized_announcements_are_rejected_before_buffering() {
        let mut header = BytesMut::new();
        header.put_u32((MAX_FRAME_LEN + 1) as u32);

        assert_eq!(
            check(&mut Cursor::new(&header[..])),
            Err(FrameError::TooLarge(MAX_FRAME_LEN + 1))
        );
    }
}
