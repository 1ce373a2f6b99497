//! Frame Codec Module
//!
//! Every message on the wire is a frame of the form
//! `<decimal-length>!<type-digit><payload>`, where the length is the ASCII
//! decimal byte count of the payload. There is no trailing delimiter: the next
//! frame's length digits follow the payload immediately.

use futures::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use std::io;
use thiserror::Error;

/// Byte separating the length field from the type digit
pub const SEPARATOR: u8 = b'!';
/// Highest frame type that fits in the single type digit
pub const MAX_FRAME_TYPE: u8 = 9;
/// Default upper bound on an advertised payload length (16MB)
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

/// Errors raised while decoding or encoding frames
#[derive(Error, Debug)]
pub enum FrameError {
    /// The byte stream does not follow the frame grammar
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// The advertised payload length is above the configured limit
    #[error("Payload too large: advertised length exceeds {max} bytes")]
    PayloadTooLarge { max: usize },

    /// A frame type outside 0-9 was requested
    #[error("Invalid frame type: {0}")]
    InvalidType(u8),

    /// The peer went away before a complete frame was exchanged
    #[error("Connection closed")]
    ConnectionClosed,

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl FrameError {
    /// Whether this error means the peer is gone rather than misbehaving
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, FrameError::ConnectionClosed)
    }
}

impl From<io::Error> for FrameError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut => FrameError::ConnectionClosed,
            _ => FrameError::Io(error),
        }
    }
}

/// One length-prefixed, typed unit of the protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: u8,
    payload: Vec<u8>,
}

impl Frame {
    /// Create a frame, rejecting types that do not fit in a single digit
    pub fn new(kind: u8, payload: impl Into<Vec<u8>>) -> Result<Self, FrameError> {
        if kind > MAX_FRAME_TYPE {
            return Err(FrameError::InvalidType(kind));
        }
        Ok(Frame {
            kind,
            payload: payload.into(),
        })
    }

    pub fn kind(&self) -> u8 {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Reads and writes frames over async byte streams
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_payload_len: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_LEN)
    }
}

impl FrameCodec {
    /// Create a codec that refuses frames advertising more than `max_payload_len` bytes
    pub fn new(max_payload_len: usize) -> Self {
        Self { max_payload_len }
    }

    pub fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    /// Decode the next frame from `reader`
    ///
    /// Blocks until the full payload has arrived. A stream that ends anywhere
    /// inside a frame yields `ConnectionClosed`; a stream that violates the
    /// grammar yields `Malformed` or `PayloadTooLarge`.
    pub async fn decode<R>(&self, reader: &mut R) -> Result<Frame, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        let len = self.read_length(reader).await?;

        let kind = read_byte(reader).await?;
        if !kind.is_ascii_digit() {
            return Err(FrameError::Malformed(format!(
                "type byte 0x{:02x} is not a digit",
                kind
            )));
        }

        // Grow with the bytes that actually arrive, not the advertised length
        let mut payload = Vec::new();
        (&mut *reader).take(len as u64).read_to_end(&mut payload).await?;
        if payload.len() != len {
            return Err(FrameError::ConnectionClosed);
        }

        Ok(Frame {
            kind: kind - b'0',
            payload,
        })
    }

    /// Accumulate length digits up to the separator
    async fn read_length<R>(&self, reader: &mut R) -> Result<usize, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        let mut len: usize = 0;
        let mut digits = 0usize;

        loop {
            let byte = read_byte(reader).await?;
            if byte == SEPARATOR {
                break;
            }
            if !byte.is_ascii_digit() {
                return Err(FrameError::Malformed(format!(
                    "unexpected byte 0x{:02x} in length field",
                    byte
                )));
            }

            digits += 1;
            len = len
                .checked_mul(10)
                .and_then(|l| l.checked_add(usize::from(byte - b'0')))
                .filter(|l| *l <= self.max_payload_len)
                .ok_or(FrameError::PayloadTooLarge {
                    max: self.max_payload_len,
                })?;
        }

        if digits == 0 {
            return Err(FrameError::Malformed("empty length field".to_string()));
        }

        Ok(len)
    }

    /// Serialize a frame into its exact wire bytes
    pub fn encode(frame: &Frame) -> Vec<u8> {
        let len = frame.payload.len().to_string();
        let mut bytes = Vec::with_capacity(len.len() + 2 + frame.payload.len());
        bytes.extend_from_slice(len.as_bytes());
        bytes.push(SEPARATOR);
        bytes.push(b'0' + frame.kind);
        bytes.extend_from_slice(&frame.payload);
        bytes
    }

    /// Encode `frame` and write it out in full, flushing the writer
    pub async fn write<W>(&self, writer: &mut W, frame: &Frame) -> Result<(), FrameError>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&Self::encode(frame)).await?;
        writer.flush().await?;
        Ok(())
    }
}

async fn read_byte<R>(reader: &mut R) -> Result<u8, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte).await?;
    Ok(byte[0])
}
