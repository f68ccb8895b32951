//! Length-delimited message framing.
//!
//! A part body is a flat sequence of frames. Each frame is a varint giving
//! the payload length, immediately followed by that many payload bytes:
//!
//! ```text
//! +--------+-----------------+--------+-----------------+----
//! | varint | payload (n0)    | varint | payload (n1)    | ...
//! +--------+-----------------+--------+-----------------+----
//! ```
//!
//! The sequence ends exactly at the end of the body. There is no
//! terminator and no checksum.

mod varint;

use crate::error::Error;
use tracing::trace;

pub use varint::{decode_varint, MAX_VARINT_LEN};

#[cfg(test)]
pub(crate) use varint::encode_varint;

/// A framing failure inside a part body.
///
/// Offsets are relative to the start of the body. The decoder turns these
/// into [`Error`] values once it knows which part they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Bytes remain but do not form a complete, valid varint
    TruncatedLength {
        /// Offset of the frame start
        offset: usize,
    },
    /// The prefix announces more bytes than remain
    TruncatedPayload {
        /// Offset of the frame start
        offset: usize,
        /// Announced payload length
        expected: u64,
        /// Bytes left after the prefix
        available: usize,
    },
}

impl FrameError {
    /// Attach the part key, producing a crate error
    pub fn into_error(self, key: &str) -> Error {
        match self {
            Self::TruncatedLength { offset } => Error::TruncatedLength {
                key: key.to_string(),
                offset,
            },
            Self::TruncatedPayload {
                offset,
                expected,
                available,
            } => Error::TruncatedPayload {
                key: key.to_string(),
                offset,
                expected,
                available,
            },
        }
    }
}

/// One framed message inside a part body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Offset of the length prefix inside the body
    pub offset: usize,
    /// Size of the length prefix in bytes
    pub prefix_len: usize,
    /// The payload bytes
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Offset of the first payload byte inside the body
    pub fn payload_offset(&self) -> usize {
        self.offset + self.prefix_len
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns true for a validly framed zero-length payload
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Lazy reader over the frames of a single buffer.
///
/// Yields `Ok(Frame)` for every complete frame and stops cleanly when no
/// bytes remain. The first framing error is yielded once, after which the
/// reader is exhausted.
#[derive(Debug, Clone)]
pub struct DelimitedReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> DelimitedReader<'a> {
    /// Creates a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    fn read_frame(&mut self) -> Result<Frame<'a>, FrameError> {
        let offset = self.position;
        let rest = &self.data[offset..];

        let (length, prefix_len) =
            decode_varint(rest).ok_or(FrameError::TruncatedLength { offset })?;

        let available = rest.len() - prefix_len;
        if length > available as u64 {
            return Err(FrameError::TruncatedPayload {
                offset,
                expected: length,
                available,
            });
        }

        // Bounded by `available`, so the cast cannot truncate
        let length = length as usize;
        let start = offset + prefix_len;
        self.position = start + length;

        trace!("Frame at offset {}: {} payload bytes", offset, length);

        Ok(Frame {
            offset,
            prefix_len,
            payload: &self.data[start..start + length],
        })
    }
}

impl<'a> Iterator for DelimitedReader<'a> {
    type Item = Result<Frame<'a>, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.data.len() {
            return None;
        }

        let frame = self.read_frame();
        if frame.is_err() {
            self.position = self.data.len();
        }
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn framed(payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = Vec::new();
        for payload in payloads {
            encode_varint(payload.len() as u64, &mut buf);
            buf.extend_from_slice(payload);
        }
        buf
    }

    #[test]
    fn test_empty_body_yields_nothing() {
        let mut reader = DelimitedReader::new(&[]);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_reads_frames_in_order() {
        let data = framed(&[b"abc", b"", b"hello"]);
        let payloads: Vec<&[u8]> = DelimitedReader::new(&data)
            .map(|frame| frame.unwrap().payload)
            .collect();
        assert_eq!(payloads, vec![&b"abc"[..], &b""[..], &b"hello"[..]]);
    }

    #[test]
    fn test_frame_offsets() {
        let data = framed(&[b"abc", b"de"]);
        let frames: Vec<Frame<'_>> = DelimitedReader::new(&data).map(Result::unwrap).collect();
        assert_eq!(frames[0].offset, 0);
        assert_eq!(frames[0].payload_offset(), 1);
        assert_eq!(frames[1].offset, 4);
        assert_eq!(frames[1].payload_offset(), 5);
        assert_eq!(frames[1].len(), 2);
    }

    #[test]
    fn test_multi_byte_length_prefix() {
        let payload = vec![0x42; 300];
        let data = framed(&[&payload]);
        let frame = DelimitedReader::new(&data).next().unwrap().unwrap();
        assert_eq!(frame.prefix_len, 2);
        assert_eq!(frame.len(), 300);
    }

    #[test]
    fn test_truncated_payload() {
        let mut data = framed(&[b"ok"]);
        data.extend_from_slice(&[0x05, b'a', b'b']);

        let mut reader = DelimitedReader::new(&data);
        assert_eq!(reader.next().unwrap().unwrap().payload, b"ok");
        assert_eq!(
            reader.next(),
            Some(Err(FrameError::TruncatedPayload {
                offset: 3,
                expected: 5,
                available: 2,
            }))
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_length() {
        let data = [0x01, b'x', 0x80];
        let results: Vec<_> = DelimitedReader::new(&data).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1], Err(FrameError::TruncatedLength { offset: 2 }));
    }

    #[test]
    fn test_huge_length_is_truncated_payload() {
        let mut data = Vec::new();
        encode_varint(u64::MAX, &mut data);
        let result = DelimitedReader::new(&data).next().unwrap();
        assert!(matches!(
            result,
            Err(FrameError::TruncatedPayload { expected: u64::MAX, available: 0, .. })
        ));
    }

    #[test]
    fn test_position_and_remaining_track_cursor() {
        let data = framed(&[b"abc", b"de"]);
        let mut reader = DelimitedReader::new(&data);
        assert_eq!((reader.position(), reader.remaining()), (0, 7));

        reader.next().unwrap().unwrap();
        assert_eq!((reader.position(), reader.remaining()), (4, 3));

        reader.next().unwrap().unwrap();
        assert_eq!((reader.position(), reader.remaining()), (7, 0));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_error_exhausts_reader() {
        let data = [0x01, b'x', 0x05, b'y'];
        let mut reader = DelimitedReader::new(&data);
        reader.next().unwrap().unwrap();
        assert!(reader.next().unwrap().is_err());
        assert_eq!(reader.remaining(), 0);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_rerun_is_deterministic() {
        let data = framed(&[b"one", b"two"]);
        let first: Vec<_> = DelimitedReader::new(&data).collect();
        let second: Vec<_> = DelimitedReader::new(&data).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_frame_error_into_error_carries_key() {
        let err = FrameError::TruncatedLength { offset: 7 }.into_error("sil:1");
        assert!(matches!(err, Error::TruncatedLength { ref key, offset: 7 } if key == "sil:1"));
    }
}
