use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// RTSP request methods (RFC 2326 §10), plus the two HTTP verbs used by
/// RTSP-over-HTTP tunnelling.
///
/// Unknown verbs decode to [`Method::Extension`] instead of failing, so
/// vendor methods can pass through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Announce,
    Describe,
    GetParameter,
    Options,
    Pause,
    Play,
    Record,
    Setup,
    SetParameter,
    Teardown,
    /// Tunnel: HTTP `GET`, opens the server-to-client channel.
    Get,
    /// Tunnel: HTTP `POST`, opens the client-to-server channel.
    Post,
    /// Any other non-empty verb.
    Extension(String),
}

impl Method {
    /// Parse a method from a byte slice.
    ///
    /// Returns an error only if the slice is empty.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        Ok(match bytes {
            b"" => return Err(ParseError::EmptyMethod),
            b"ANNOUNCE" => Self::Announce,
            b"DESCRIBE" => Self::Describe,
            b"GET_PARAMETER" => Self::GetParameter,
            b"OPTIONS" => Self::Options,
            b"PAUSE" => Self::Pause,
            b"PLAY" => Self::Play,
            b"RECORD" => Self::Record,
            b"SETUP" => Self::Setup,
            b"SET_PARAMETER" => Self::SetParameter,
            b"TEARDOWN" => Self::Teardown,
            b"GET" => Self::Get,
            b"POST" => Self::Post,
            other => Self::Extension(String::from_utf8_lossy(other).into_owned()),
        })
    }

    /// Return the method as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Announce => "ANNOUNCE",
            Self::Describe => "DESCRIBE",
            Self::GetParameter => "GET_PARAMETER",
            Self::Options => "OPTIONS",
            Self::Pause => "PAUSE",
            Self::Play => "PLAY",
            Self::Record => "RECORD",
            Self::Setup => "SETUP",
            Self::SetParameter => "SET_PARAMETER",
            Self::Teardown => "TEARDOWN",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Extension(m) => m,
        }
    }

    /// `true` for the verbs borrowed from HTTP for tunnelling.
    pub fn is_tunnel(&self) -> bool {
        matches!(self, Self::Get | Self::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// Protocol tag of the request line.
///
/// `Http10` is tunnel mode: the request travels inside HTTP/1.0 framing and
/// its target is written in origin form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    /// RTSP/1.0
    #[default]
    Rtsp10,
    /// HTTP/1.0 (tunnel mode)
    Http10,
}

impl Protocol {
    /// Parse a protocol tag from a byte slice (e.g. `b"RTSP/1.0"`).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        match bytes {
            b"RTSP/1.0" => Ok(Self::Rtsp10),
            b"HTTP/1.0" => Ok(Self::Http10),
            _ => Err(ParseError::UnsupportedProtocolVersion(
                String::from_utf8_lossy(bytes).into_owned(),
            )),
        }
    }

    /// Return the tag as a static string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rtsp10 => "RTSP/1.0",
            Self::Http10 => "HTTP/1.0",
        }
    }

    /// `true` when requests under this tag use tunnel framing.
    pub fn is_tunneled(&self) -> bool {
        matches!(self, Self::Http10)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
