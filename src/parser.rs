use std::io::{self, BufRead};

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configurable limits for the RTSP request decoder.
///
/// All sizes are in bytes and exclude the token's delimiter.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum length of the method token (default: 64).
    pub max_method_len: usize,
    /// Maximum length of the request target (default: 2 048).
    pub max_target_len: usize,
    /// Maximum length of the protocol tag (default: 64).
    pub max_protocol_len: usize,
    /// Maximum number of header fields (default: 255).
    pub max_header_count: usize,
    /// Maximum length of a single header field name (default: 512).
    pub max_header_name_len: usize,
    /// Maximum length of a single header field value (default: 2 048).
    pub max_header_value_len: usize,
    /// Maximum body size (default: 128 KiB).
    pub max_body_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_method_len: 64,
            max_target_len: 2_048,
            max_protocol_len: 64,
            max_header_count: 255,
            max_header_name_len: 512,
            max_header_value_len: 2_048,
            max_body_size: 128 * 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// Bounded tokenizer
// ---------------------------------------------------------------------------

/// Read bytes up to `delimiter`, returning them without the delimiter.
///
/// At most `max_len` bytes may precede the delimiter; the delimiter itself
/// is consumed. The source is scanned in whatever batches its buffer hands
/// out, so the cost is linear in the bytes read.
///
/// # Errors
///
/// - [`ParseError::TokenTooLong`] when `max_len` bytes were read without
///   finding the delimiter.
/// - [`ParseError::TruncatedInput`] when the source ends first.
pub fn read_token<R: BufRead + ?Sized>(
    reader: &mut R,
    delimiter: u8,
    max_len: usize,
    token: &'static str,
) -> Result<Vec<u8>, ParseError> {
    let mut out = Vec::new();

    loop {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if available.is_empty() {
            return Err(ParseError::TruncatedInput);
        }

        // Never look further than one byte past the budget: that byte is
        // either the delimiter or proof the token is too long.
        let budget = max_len - out.len();
        let window = &available[..available.len().min(budget.saturating_add(1))];

        match window.iter().position(|&b| b == delimiter) {
            Some(pos) => {
                out.extend_from_slice(&window[..pos]);
                reader.consume(pos + 1);
                return Ok(out);
            }
            None if window.len() > budget => {
                return Err(ParseError::TokenTooLong {
                    token,
                    limit: max_len,
                });
            }
            None => {
                let n = window.len();
                out.extend_from_slice(window);
                reader.consume(n);
            }
        }
    }
}

/// Consume exactly one byte and check that it equals `expected`.
///
/// `what` describes the expectation for the error message.
pub fn expect_byte<R: BufRead + ?Sized>(
    reader: &mut R,
    expected: u8,
    what: &'static str,
) -> Result<(), ParseError> {
    let found = read_byte(reader)?;
    if found == expected {
        Ok(())
    } else {
        Err(ParseError::UnexpectedByte {
            expected: what,
            found,
        })
    }
}

/// Consume and return a single byte.
pub fn read_byte<R: BufRead + ?Sized>(reader: &mut R) -> Result<u8, ParseError> {
    let byte = peek_byte(reader)?;
    reader.consume(1);
    Ok(byte)
}

/// Return the next byte without consuming it.
pub fn peek_byte<R: BufRead + ?Sized>(reader: &mut R) -> Result<u8, ParseError> {
    loop {
        match reader.fill_buf() {
            Ok([]) => return Err(ParseError::TruncatedInput),
            Ok(buf) => return Ok(buf[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Consume bytes while they equal `byte`.
pub fn skip_byte<R: BufRead + ?Sized>(reader: &mut R, byte: u8) -> Result<(), ParseError> {
    while peek_byte(reader)? == byte {
        reader.consume(1);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    #[test]
    fn token_excludes_delimiter_and_consumes_it() {
        let mut src = Cursor::new(&b"PLAY rtsp://h/a"[..]);
        let tok = read_token(&mut src, b' ', 64, "method").unwrap();
        assert_eq!(tok, b"PLAY");
        assert_eq!(src.position(), 5);
    }

    #[test]
    fn token_at_exact_limit_is_accepted() {
        let mut raw = vec![b'A'; 64];
        raw.push(b' ');
        let tok = read_token(&mut Cursor::new(raw), b' ', 64, "method").unwrap();
        assert_eq!(tok.len(), 64);
    }

    #[test]
    fn token_one_past_limit_is_rejected() {
        let mut raw = vec![b'A'; 65];
        raw.push(b' ');
        let err = read_token(&mut Cursor::new(raw), b' ', 64, "method").unwrap_err();
        assert!(matches!(
            err,
            ParseError::TokenTooLong {
                token: "method",
                limit: 64
            }
        ));
    }

    #[test]
    fn token_limit_holds_across_small_buffers() {
        // A 3-byte buffer forces many fill_buf rounds.
        let mut raw = vec![b'x'; 20];
        raw.push(b'\r');
        let mut small = BufReader::with_capacity(3, Cursor::new(raw.clone()));
        assert_eq!(read_token(&mut small, b'\r', 20, "t").unwrap().len(), 20);

        let mut small = BufReader::with_capacity(3, Cursor::new(raw));
        assert!(matches!(
            read_token(&mut small, b'\r', 19, "t"),
            Err(ParseError::TokenTooLong { limit: 19, .. })
        ));
    }

    #[test]
    fn token_without_delimiter_is_truncated() {
        let err = read_token(&mut Cursor::new(&b"OPTI"[..]), b' ', 64, "method").unwrap_err();
        assert!(matches!(err, ParseError::TruncatedInput));
    }

    #[test]
    fn empty_token_is_returned_as_empty() {
        let tok = read_token(&mut Cursor::new(&b" rest"[..]), b' ', 64, "method").unwrap();
        assert!(tok.is_empty());
    }

    #[test]
    fn expect_byte_matches_and_mismatches() {
        let mut src = Cursor::new(&b"\nX"[..]);
        expect_byte(&mut src, b'\n', "LF").unwrap();
        let err = expect_byte(&mut src, b'\n', "LF").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedByte {
                expected: "LF",
                found: b'X'
            }
        ));
        assert!(matches!(
            expect_byte(&mut src, b'\n', "LF"),
            Err(ParseError::TruncatedInput)
        ));
    }

    #[test]
    fn skip_byte_stops_at_other_byte() {
        let mut src = Cursor::new(&b"   v"[..]);
        skip_byte(&mut src, b' ').unwrap();
        assert_eq!(read_byte(&mut src).unwrap(), b'v');
    }
}
