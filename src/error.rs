use std::io;

use thiserror::Error;

/// Errors that can occur while decoding an RTSP request.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A delimited token ran past its length ceiling without a delimiter.
    #[error("{token} exceeds {limit} bytes")]
    TokenTooLong {
        /// Which token was being read (e.g. `"method"`).
        token: &'static str,
        /// The ceiling, excluding the delimiter.
        limit: usize,
    },
    /// The input ended before the request was complete.
    #[error("truncated RTSP request")]
    TruncatedInput,
    /// A single expected byte did not match.
    #[error("unexpected byte 0x{found:02X} (expected {expected})")]
    UnexpectedByte {
        /// Human-readable description of what was expected.
        expected: &'static str,
        /// The actual byte value found.
        found: u8,
    },
    /// The request line starts with a space.
    #[error("empty method")]
    EmptyMethod,
    /// The request target is neither `*` nor a parseable target.
    #[error("invalid request target: '{0}'")]
    InvalidTarget(String),
    /// The protocol tag is not one of the accepted literals.
    #[error("expected 'RTSP/1.0' or 'HTTP/1.0', got '{0}'")]
    UnsupportedProtocolVersion(String),
    /// The request line's CR was not followed by LF.
    #[error("malformed line ending: expected LF after CR, got 0x{0:02X}")]
    MalformedLineEnding(u8),
    /// The header block holds more fields than allowed.
    #[error("header count exceeds {limit}")]
    TooManyHeaders {
        /// Configured maximum number of header fields.
        limit: usize,
    },
    /// A header line is structurally invalid.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// The `Content-Length` header value is not a valid length.
    #[error("invalid Content-Length: '{0}'")]
    InvalidContentLength(String),
    /// The declared body is larger than allowed.
    #[error("Content-Length {length} exceeds maximum of {limit}")]
    BodyTooLarge {
        /// Declared body length.
        length: usize,
        /// Configured maximum body size.
        limit: usize,
    },
    /// The underlying source failed.
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedInput
        } else {
            Self::Io(err)
        }
    }
}

/// Errors that can occur while encoding an RTSP request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The destination buffer cannot hold the encoded request.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes required for the write that failed.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },
    /// The method is empty or would break the request line.
    #[error("invalid method: '{0}'")]
    InvalidMethod(String),
    /// A header name cannot be written on the wire.
    #[error("invalid header name: '{0}'")]
    InvalidHeaderName(String),
    /// A header value contains a line break.
    #[error("invalid value for header '{name}'")]
    InvalidHeaderValue {
        /// Name of the offending header.
        name: String,
    },
}
