use crate::request::Request;

/// Serialize a [`Request`] to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(request: &Request, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(request).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(request).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render a [`Request`] in a human-readable debug format.
pub fn format_debug(request: &Request) -> String {
    let mut out = String::with_capacity(256);

    out.push_str("=== RTSP Request ===\n");
    out.push_str(&format!("Method:   {}\n", request.method));
    match &request.target {
        Some(target) => out.push_str(&format!("Target:   {}\n", target.without_credentials())),
        None => out.push_str("Target:   * (wildcard)\n"),
    }
    out.push_str(&format!("Protocol: {}", request.protocol));
    if request.protocol.is_tunneled() {
        out.push_str(" (tunnel)");
    }
    out.push('\n');

    let fields: Vec<_> = request.headers.iter().collect();
    out.push_str(&format!("\n--- Headers ({}) ---\n", fields.len()));
    for (name, value) in fields {
        out.push_str(&format!("  {name}: {value}\n"));
    }

    if request.body.is_empty() {
        out.push_str("\n--- No Body ---\n");
    } else {
        out.push_str(&format!("\n--- Body ({} bytes) ---\n", request.body.len()));
        match request.body_as_str() {
            Some(s) => out.push_str(s),
            None => out.push_str(&format!("<binary data: {} bytes>", request.body.len())),
        }
        out.push('\n');
    }

    out.push_str("====================\n");
    out
}

/// Render only the request line and headers (no body).
///
/// The target is shown with credentials stripped.
pub fn format_headers_only(request: &Request) -> String {
    let target = request
        .target
        .as_ref()
        .map_or_else(|| "*".to_owned(), |t| t.without_credentials().to_string());

    let mut out = format!("{} {} {}\n", request.method, target, request.protocol);
    for (name, value) in request.headers.iter() {
        out.push_str(&format!("{name}: {value}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_request;

    const RAW: &[u8] = b"ANNOUNCE rtsp://u:p@h/a RTSP/1.0\r\nCSeq: 7\r\nContent-Length: 3\r\n\r\nv=0";

    #[test]
    fn json_has_wire_names() {
        let req = parse_request(RAW).unwrap();
        let json: serde_json::Value = serde_json::from_str(&format_json(&req, false)).unwrap();
        assert_eq!(json["method"], "ANNOUNCE");
        assert_eq!(json["protocol"], "RTSP/1.0");
        assert_eq!(json["headers"]["CSeq"][0], "7");
        assert_eq!(json["body"], "v=0");
    }

    #[test]
    fn debug_and_headers_hide_credentials() {
        let req = parse_request(RAW).unwrap();
        for text in [format_debug(&req), format_headers_only(&req)] {
            assert!(!text.contains("u:p@"), "{text}");
            assert!(text.contains("rtsp://h/a"), "{text}");
        }
    }

    #[test]
    fn headers_only_shows_wildcard() {
        let req = parse_request(b"OPTIONS * RTSP/1.0\r\nCSeq: 1\r\n\r\n").unwrap();
        assert_eq!(format_headers_only(&req), "OPTIONS * RTSP/1.0\nCSeq: 1\n");
    }
}
