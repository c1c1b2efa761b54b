use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;

use crate::error::{EncodeError, ParseError};
use crate::parser::{ParserConfig, expect_byte, read_byte, read_token, skip_byte};

/// Header block of an RTSP message: field name → values, in arrival order.
///
/// Names are normalized on every insert and lookup (`cseq` and `CSEQ` both
/// become `CSeq`), and keys are kept sorted so encoding is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderMap {
    fields: BTreeMap<String, Vec<String>>,
}

impl HeaderMap {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&normalize_name(name))
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of `name`, in arrival order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.fields
            .get(&normalize_name(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Replace every value of `name` with `value`.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(normalize_name(name), vec![value.into()]);
    }

    /// Add `value` after any existing values of `name`.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .entry(normalize_name(name))
            .or_default()
            .push(value.into());
    }

    /// Remove `name`, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.fields.remove(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&normalize_name(name))
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs in encoding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    // ----- decode ---------------------------------------------------------

    /// Read a header block, up to and including its terminating blank line.
    ///
    /// # Errors
    ///
    /// Fails on limit breaches from `config`, malformed line endings, and
    /// truncated input.
    pub fn decode<R: BufRead + ?Sized>(
        reader: &mut R,
        config: &ParserConfig,
    ) -> Result<Self, ParseError> {
        let mut map = Self::new();
        let mut count = 0;

        loop {
            let first = read_byte(reader)?;
            if first == b'\r' {
                expect_byte(reader, b'\n', "LF after end-of-headers CR")?;
                return Ok(map);
            }
            if first == b':' {
                return Err(ParseError::InvalidHeader("empty header name".into()));
            }
            if count >= config.max_header_count {
                return Err(ParseError::TooManyHeaders {
                    limit: config.max_header_count,
                });
            }

            let mut name = vec![first];
            let rest = read_token(
                reader,
                b':',
                config.max_header_name_len.saturating_sub(1),
                "header name",
            )
            .map_err(|e| match e {
                ParseError::TokenTooLong { token, .. } => ParseError::TokenTooLong {
                    token,
                    limit: config.max_header_name_len,
                },
                other => other,
            })?;
            name.extend_from_slice(&rest);
            let name = String::from_utf8_lossy(&name);
            if !is_valid_name(&name) {
                return Err(ParseError::InvalidHeader(format!(
                    "invalid header name '{}'",
                    name.escape_debug()
                )));
            }

            skip_byte(reader, b' ')?;

            let mut value = read_token(
                reader,
                b'\r',
                config.max_header_value_len,
                "header value",
            )?;
            expect_byte(reader, b'\n', "LF after header value CR")?;
            while value.last().is_some_and(|&b| b == b' ' || b == b'\t') {
                value.pop();
            }

            map.append(&name, String::from_utf8_lossy(&value).into_owned());
            count += 1;
        }
    }

    // ----- encode ---------------------------------------------------------

    /// Exact number of bytes [`HeaderMap::encode_into`] writes, including
    /// the terminating blank line.
    pub fn encoded_len(&self) -> usize {
        self.fields
            .keys()
            .map(|name| self.field_len(name))
            .sum::<usize>()
            + 2
    }

    /// Bytes taken by every `name: value\r\n` line of `name`.
    pub fn field_len(&self, name: &str) -> usize {
        let name = normalize_name(name);
        self.fields
            .get(&name)
            .map(|values| values.iter().map(|v| line_len(&name, v)).sum())
            .unwrap_or(0)
    }

    /// Write the header block into `buf`, returning the bytes written.
    ///
    /// # Errors
    ///
    /// Rejects names and values that would break the line structure, and
    /// buffers shorter than [`HeaderMap::encoded_len`].
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut out = Cursor::new(buf);

        for (name, values) in &self.fields {
            if !is_valid_name(name) {
                return Err(EncodeError::InvalidHeaderName(name.clone()));
            }
            for value in values {
                if value.bytes().any(|b| b == b'\r' || b == b'\n') {
                    return Err(EncodeError::InvalidHeaderValue { name: name.clone() });
                }
                out.put(name.as_bytes())?;
                out.put(b": ")?;
                out.put(value.as_bytes())?;
                out.put(b"\r\n")?;
            }
        }
        out.put(b"\r\n")?;

        Ok(out.pos)
    }
}

/// Length of one encoded `name: value\r\n` line.
pub(crate) fn line_len(name: &str, value: &str) -> usize {
    name.len() + 2 + value.len() + 2
}

/// Bounds-checked write cursor over a destination slice.
pub(crate) struct Cursor<'a> {
    buf: &'a mut [u8],
    pub(crate) pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn put(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        let available = self.buf.len() - self.pos;
        if bytes.len() > available {
            return Err(EncodeError::BufferTooSmall {
                needed: bytes.len(),
                available,
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Hand the unwritten tail to `write`, advancing by what it reports.
    pub(crate) fn put_with(
        &mut self,
        write: impl FnOnce(&mut [u8]) -> Result<usize, EncodeError>,
    ) -> Result<(), EncodeError> {
        self.pos += write(&mut self.buf[self.pos..])?;
        Ok(())
    }
}

/// Canonical spelling of a header name.
///
/// `Content-Length` style (upper-case first letter and every letter after a
/// `-`), except for the names RTSP spells irregularly. Names containing
/// anything but token characters are returned unchanged.
pub fn normalize_name(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "cseq" => return "CSeq".into(),
        "rtp-info" => return "RTP-Info".into(),
        "www-authenticate" => return "WWW-Authenticate".into(),
        _ => {}
    }

    if !name.bytes().all(is_tchar) {
        return name.to_owned();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// A header name is a non-empty run of token characters. Decode and encode
/// accept exactly this set.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_tchar)
}

/// `tchar` – characters allowed in header names.
#[inline]
fn is_tchar(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
            | b'0'..=b'9'
            | b'a'..=b'z'
            | b'A'..=b'Z'
    )
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------
