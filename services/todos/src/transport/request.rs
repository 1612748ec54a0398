use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Read},
    net::TcpStream,
};

use super::{HttpRequest, MAX_HTTP_BODY_BYTES};

pub(super) fn read_http_request(stream: &mut TcpStream) -> Result<Option<HttpRequest>, String> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    let bytes = reader
        .read_line(&mut request_line)
        .map_err(|e| e.to_string())?;
    if bytes == 0 {
        return Ok(None);
    }

    let (method, target) = parse_request_line(&request_line)?;

    let mut headers = HashMap::new();
    loop {
        let mut header_line = String::new();
        let bytes = reader
            .read_line(&mut header_line)
            .map_err(|e| e.to_string())?;
        if bytes == 0 || header_line == "\r\n" || header_line == "\n" {
            break;
        }
        let (name, value) = header_line
            .split_once(':')
            .ok_or_else(|| "invalid HTTP header".to_string())?;
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    let content_length = parse_content_length(&headers)?;
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).map_err(|e| e.to_string())?;
    }

    Ok(Some(HttpRequest {
        method,
        target,
        body,
    }))
}

pub(super) fn parse_content_length(headers: &HashMap<String, String>) -> Result<usize, String> {
    let content_length = match headers.get("content-length") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| "invalid content-length header".to_string())?,
        None => 0,
    };
    if content_length > MAX_HTTP_BODY_BYTES {
        return Err(format!(
            "content-length exceeds max body size ({MAX_HTTP_BODY_BYTES} bytes)"
        ));
    }
    Ok(content_length)
}

/// Splits a request target into its path and query parameters. Later
/// duplicates of a query key win.
pub(super) fn split_target(target: &str) -> (String, HashMap<String, String>) {
    let (path, query_str) = target
        .split_once('?')
        .map(|(path, query)| (path, Some(query)))
        .unwrap_or((target, None));
    let mut query = HashMap::new();
    if let Some(query_str) = query_str {
        for pair in query_str.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            query.insert(k.to_string(), v.to_string());
        }
    }
    (path.to_string(), query)
}

pub(super) fn parse_request_line(line: &str) -> Result<(String, String), String> {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| "missing HTTP method".to_string())?;
    let target = parts
        .next()
        .ok_or_else(|| "missing HTTP target".to_string())?;
    let version = parts
        .next()
        .ok_or_else(|| "missing HTTP version".to_string())?;
    if !version.starts_with("HTTP/1.") {
        return Err("unsupported HTTP version".to_string());
    }
    Ok((method.to_string(), target.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_target_separates_path_and_query() {
        let (path, query) = split_target("/todos?completed=true&x");
        assert_eq!(path, "/todos");
        assert_eq!(query.get("completed").map(String::as_str), Some("true"));
        assert_eq!(query.get("x").map(String::as_str), Some(""));
    }

    #[test]
    fn split_target_without_query_is_empty_map() {
        let (path, query) = split_target("/todos/12");
        assert_eq!(path, "/todos/12");
        assert!(query.is_empty());
    }

    #[test]
    fn parse_request_line_rejects_non_http1() {
        assert_eq!(
            parse_request_line("GET /todos HTTP/1.1\r\n"),
            Ok(("GET".to_string(), "/todos".to_string()))
        );
        assert!(parse_request_line("GET /todos HTTP/2").is_err());
        assert!(parse_request_line("GET").is_err());
    }

    #[test]
    fn content_length_guard_rejects_oversized_bodies() {
        let mut headers = HashMap::new();
        headers.insert("content-length".to_string(), "2000000".to_string());
        let err = parse_content_length(&headers).unwrap_err();
        assert!(err.contains("exceeds max body size"));

        headers.insert("content-length".to_string(), "17".to_string());
        assert_eq!(parse_content_length(&headers), Ok(17));
        assert_eq!(parse_content_length(&HashMap::new()), Ok(0));
    }
}
