use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::io::BufRead;

use crate::body::{self, CONTENT_LENGTH};
use crate::error::{EncodeError, ParseError};
use crate::header::{Cursor, HeaderMap, line_len};
use crate::parser::{ParserConfig, expect_byte, read_token};
use crate::target::Target;
use crate::types::{Method, Protocol};

/// An RTSP request.
///
/// Built fresh for every decoded or outgoing message. Encoding writes a
/// `Content-Length` header into [`Request::headers`] whenever the body is
/// non-empty, so a `Request` must not be shared between threads while it is
/// being encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    /// The request method.
    pub method: Method,
    /// The request target; `None` is the wildcard `*`.
    pub target: Option<Target>,
    /// Protocol tag. [`Protocol::Http10`] selects tunnel framing.
    pub protocol: Protocol,
    /// Header fields.
    pub headers: HeaderMap,
    /// The body, empty when absent.
    #[serde(serialize_with = "serialize_body")]
    pub body: Vec<u8>,
}

/// Serialize body bytes as a UTF-8 string (lossy) for JSON output.
fn serialize_body<S: Serializer>(body: &[u8], s: S) -> Result<S::Ok, S::Error> {
    if body.is_empty() {
        s.serialize_none()
    } else {
        s.serialize_str(&String::from_utf8_lossy(body))
    }
}

impl Request {
    /// Create an `RTSP/1.0` request with no headers and no body.
    pub fn new(method: Method, target: Option<Target>) -> Self {
        Self {
            method,
            target,
            protocol: Protocol::default(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    // ----- decode ---------------------------------------------------------

    /// Read one request from `reader` using the default limits.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] hit; nothing is recovered.
    pub fn unmarshal<R: BufRead + ?Sized>(reader: &mut R) -> Result<Self, ParseError> {
        Self::unmarshal_with_config(reader, &ParserConfig::default())
    }

    /// Read one request from `reader` using custom [`ParserConfig`] limits.
    ///
    /// The scan is forward-only: on success the reader is positioned right
    /// after the body, ready for the next message.
    pub fn unmarshal_with_config<R: BufRead + ?Sized>(
        reader: &mut R,
        config: &ParserConfig,
    ) -> Result<Self, ParseError> {
        let raw = read_token(reader, b' ', config.max_method_len, "method")?;
        let method = Method::from_bytes(&raw)?;
        tracing::trace!(%method, "read method");

        let raw = read_token(reader, b' ', config.max_target_len, "target")?;
        let target = match raw.as_slice() {
            b"*" => None,
            raw => {
                let text = std::str::from_utf8(raw).map_err(|_| {
                    ParseError::InvalidTarget(String::from_utf8_lossy(raw).into_owned())
                })?;
                Some(Target::parse(text)?)
            }
        };

        let raw = read_token(reader, b'\r', config.max_protocol_len, "protocol")?;
        let protocol = Protocol::from_bytes(&raw)?;

        expect_byte(reader, b'\n', "LF after request line").map_err(|e| match e {
            ParseError::UnexpectedByte { found, .. } => ParseError::MalformedLineEnding(found),
            other => other,
        })?;

        let headers = HeaderMap::decode(reader, config)?;
        let body = body::decode(&headers, reader, config.max_body_size)?;

        tracing::debug!(
            %method,
            %protocol,
            headers = headers.len(),
            body_len = body.len(),
            "decoded request"
        );

        Ok(Self {
            method,
            target,
            protocol,
            headers,
            body,
        })
    }

    // ----- encode ---------------------------------------------------------

    /// Exact encoded size, without touching the request.
    ///
    /// Accounts for the `Content-Length` header that encoding injects, so
    /// this always equals what [`Request::marshal_size`] returns.
    pub fn encoded_len(&self) -> usize {
        let mut headers_len = self.headers.encoded_len();
        if let Some(length) = self.computed_content_length() {
            headers_len = headers_len - self.headers.field_len(CONTENT_LENGTH)
                + line_len(CONTENT_LENGTH, &length);
        }

        self.request_line_len() + headers_len + body::encoded_len(&self.body)
    }

    /// First encoding pass: sync `Content-Length` with the body, then
    /// return the exact number of bytes [`Request::marshal_to`] will write.
    ///
    /// When the body is non-empty this replaces any `Content-Length` in
    /// [`Request::headers`] with the body's length. Do not change the body
    /// or headers between this call and `marshal_to`.
    pub fn marshal_size(&mut self) -> usize {
        self.sync_content_length();
        self.request_line_len() + self.headers.encoded_len() + body::encoded_len(&self.body)
    }

    /// Second encoding pass: write the request into `buf`.
    ///
    /// Returns the number of bytes written, which equals
    /// [`Request::marshal_size`] for an unchanged request.
    ///
    /// # Errors
    ///
    /// [`EncodeError::BufferTooSmall`] if `buf` is shorter than needed,
    /// [`EncodeError::InvalidMethod`] for an empty method or one containing
    /// SP/CR/LF, or a header error if a field cannot be represented on the
    /// wire.
    pub fn marshal_to(&mut self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let method = self.method.as_str();
        if method.is_empty() || method.bytes().any(|b| matches!(b, b' ' | b'\r' | b'\n')) {
            return Err(EncodeError::InvalidMethod(method.to_owned()));
        }
        self.sync_content_length();

        let mut out = Cursor::new(buf);
        out.put(self.method.as_str().as_bytes())?;
        out.put(b" ")?;
        out.put(self.target_text().as_bytes())?;
        out.put(b" ")?;
        out.put(self.protocol.as_str().as_bytes())?;
        out.put(b"\r\n")?;
        out.put_with(|buf| self.headers.encode_into(buf))?;
        out.put_with(|buf| body::encode_into(buf, &self.body))?;

        tracing::debug!(
            method = %self.method,
            protocol = %self.protocol,
            bytes = out.pos,
            "encoded request"
        );
        Ok(out.pos)
    }

    /// Encode the request, running both passes back to back.
    pub fn marshal(&mut self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = vec![0; self.marshal_size()];
        let n = self.marshal_to(&mut buf)?;
        debug_assert_eq!(n, buf.len());
        Ok(buf)
    }

    // ----- accessors ------------------------------------------------------

    /// First value of the header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The `CSeq` header, if present and numeric.
    pub fn cseq(&self) -> Option<u32> {
        self.header("CSeq").and_then(|v| v.trim().parse().ok())
    }

    /// The `Content-Length` header, if present and valid.
    pub fn content_length(&self) -> Option<usize> {
        self.header(CONTENT_LENGTH)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Return the body as a UTF-8 `&str` if it is valid UTF-8.
    pub fn body_as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    // ----- helpers --------------------------------------------------------

    /// Target as written on the request line.
    ///
    /// Tunnel mode carries only the path; otherwise the full target goes out
    /// with credentials stripped.
    fn target_text(&self) -> Cow<'_, str> {
        match &self.target {
            None => Cow::Borrowed("*"),
            Some(target) if self.protocol.is_tunneled() => Cow::Borrowed(target.path()),
            Some(target) if target.has_credentials() => {
                Cow::Owned(target.without_credentials().to_string())
            }
            Some(target) => Cow::Borrowed(target.as_str()),
        }
    }

    fn request_line_len(&self) -> usize {
        self.method.as_str().len()
            + 1
            + self.target_text().len()
            + 1
            + self.protocol.as_str().len()
            + 2
    }

    /// `Content-Length` value encoding will set, if any.
    fn computed_content_length(&self) -> Option<String> {
        (!self.body.is_empty()).then(|| self.body.len().to_string())
    }

    fn sync_content_length(&mut self) {
        if let Some(length) = self.computed_content_length() {
            self.headers.insert(CONTENT_LENGTH, length);
        }
    }
}

impl fmt::Display for Request {
    /// Lossy text of the encoded request, for logs. A request that cannot
    /// be encoded renders as a placeholder naming the encode error.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clone().marshal() {
            Ok(bytes) => f.write_str(&String::from_utf8_lossy(&bytes)),
            Err(e) => write!(f, "<unencodable request: {e}>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------
