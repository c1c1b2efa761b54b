use std::io::{BufRead, Read};

use crate::error::{EncodeError, ParseError};
use crate::header::HeaderMap;

/// Name of the header that frames an RTSP body.
pub const CONTENT_LENGTH: &str = "Content-Length";

/// Read the body announced by `headers`.
///
/// Without a `Content-Length` the body is empty. Repeated identical
/// `Content-Length` values are accepted; differing ones are not.
///
/// # Errors
///
/// - [`ParseError::InvalidContentLength`] for unparsable or conflicting values.
/// - [`ParseError::BodyTooLarge`] when the length exceeds `max_body_size`;
///   this is checked before anything is allocated.
/// - [`ParseError::TruncatedInput`] when the source ends early.
pub fn decode<R: BufRead + ?Sized>(
    headers: &HeaderMap,
    reader: &mut R,
    max_body_size: usize,
) -> Result<Vec<u8>, ParseError> {
    let values = headers.get_all(CONTENT_LENGTH);
    let Some(first) = values.first() else {
        return Ok(Vec::new());
    };

    let first = first.trim();
    if values.iter().any(|v| v.trim() != first) {
        return Err(ParseError::InvalidContentLength(
            "multiple differing Content-Length values".into(),
        ));
    }

    let length: usize = first
        .parse()
        .map_err(|_| ParseError::InvalidContentLength(first.to_owned()))?;
    if length > max_body_size {
        return Err(ParseError::BodyTooLarge {
            length,
            limit: max_body_size,
        });
    }

    let mut body = vec![0; length];
    reader.read_exact(&mut body)?;
    Ok(body)
}

/// Bytes [`encode_into`] writes for `body`.
pub fn encoded_len(body: &[u8]) -> usize {
    body.len()
}

/// Write `body` verbatim into `buf`.
pub fn encode_into(buf: &mut [u8], body: &[u8]) -> Result<usize, EncodeError> {
    let available = buf.len();
    let dst = buf
        .get_mut(..body.len())
        .ok_or(EncodeError::BufferTooSmall {
            needed: body.len(),
            available,
        })?;
    dst.copy_from_slice(body);
    Ok(body.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name, *value);
        }
        map
    }

    #[test]
    fn no_content_length_means_empty_body() {
        let mut src = Cursor::new(&b"trailing"[..]);
        let body = decode(&HeaderMap::new(), &mut src, 1024).unwrap();
        assert!(body.is_empty());
        assert_eq!(src.position(), 0);
    }

    #[test]
    fn reads_exactly_content_length_bytes() {
        let mut src = Cursor::new(&b"v=0\r\nNEXT"[..]);
        let body = decode(&headers(&[("Content-Length", "5")]), &mut src, 1024).unwrap();
        assert_eq!(body, b"v=0\r\n");
        assert_eq!(src.position(), 5);
    }

    #[test]
    fn identical_duplicates_are_accepted() {
        let map = headers(&[("Content-Length", "3"), ("content-length", " 3")]);
        let body = decode(&map, &mut Cursor::new(&b"abc"[..]), 1024).unwrap();
        assert_eq!(body, b"abc");
    }

    #[test]
    fn differing_duplicates_are_rejected() {
        let map = headers(&[("Content-Length", "3"), ("Content-Length", "4")]);
        assert!(matches!(
            decode(&map, &mut Cursor::new(&b"abcd"[..]), 1024),
            Err(ParseError::InvalidContentLength(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_and_negative_lengths() {
        for bad in ["abc", "-1", "1.5", ""] {
            let map = headers(&[("Content-Length", bad)]);
            assert!(
                matches!(
                    decode(&map, &mut Cursor::new(&b""[..]), 1024),
                    Err(ParseError::InvalidContentLength(_))
                ),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn rejects_oversized_body_before_reading() {
        let map = headers(&[("Content-Length", "999999999999")]);
        assert!(matches!(
            decode(&map, &mut Cursor::new(&b""[..]), 128 * 1024),
            Err(ParseError::BodyTooLarge { limit: 131_072, .. })
        ));
    }

    #[test]
    fn short_body_is_truncated() {
        let map = headers(&[("Content-Length", "10")]);
        assert!(matches!(
            decode(&map, &mut Cursor::new(&b"abc"[..]), 1024),
            Err(ParseError::TruncatedInput)
        ));
    }

    #[test]
    fn encode_is_identity() {
        let mut buf = [0u8; 8];
        assert_eq!(encoded_len(b"abc"), 3);
        assert_eq!(encode_into(&mut buf, b"abc").unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        assert!(encode_into(&mut buf[..2], b"abc").is_err());
    }
}
