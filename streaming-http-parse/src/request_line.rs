use std::fmt;
use std::str::FromStr;

use log::trace;

use super::error::ParseError;

pub(crate) const CRLF: &[u8] = b"\r\n";

const HTTP_NAME: &str = "HTTP";
const HTTP_VERSION: &str = "1.1";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PATCH,
    PUT,
    DELETE,
    OPTIONS,
}
impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}
impl FromStr for HttpMethod {
    type Err = ();

    fn from_str(input: &str) -> Result<HttpMethod, Self::Err> {
        match input {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PATCH" => Ok(HttpMethod::PATCH),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            _ => Err(()),
        }
    }
}
impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first line of a request, e.g. `GET /coffee HTTP/1.1`.
///
/// Only ever built whole by [`parse_request_line`]; the target is kept
/// exactly as received (no percent-decoding).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestLine {
    pub method: HttpMethod,
    pub target: String,
    pub http_version: String,
}

pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|window| window == CRLF)
}

/// Parses a request line from the start of `data`.
///
/// Returns `Ok(None)` while no CRLF has arrived yet, otherwise the parsed line
/// together with the number of bytes it occupied (terminator included).
pub fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let idx = match find_crlf(data) {
        Some(idx) => idx,
        None => return Ok(None),
    };
    let raw = &data[..idx];

    let parts: Vec<&[u8]> = raw.split(|&b| b == b' ').collect();
    if parts.len() != 3 {
        return Err(ParseError::malformed_request_line(raw));
    }

    let protocol: Vec<&[u8]> = parts[2].split(|&b| b == b'/').collect();
    if protocol.len() != 2
        || protocol[0] != HTTP_NAME.as_bytes()
        || protocol[1] != HTTP_VERSION.as_bytes()
    {
        return Err(ParseError::malformed_request_line(raw));
    }

    let method = std::str::from_utf8(parts[0])
        .ok()
        .and_then(|method| HttpMethod::from_str(method).ok())
        .ok_or_else(|| ParseError::malformed_request_line(raw))?;

    // the target is opaque; bytes outside UTF-8 are kept as replacement chars
    let request_line = RequestLine {
        method,
        target: String::from_utf8_lossy(parts[1]).into_owned(),
        http_version: HTTP_VERSION.to_owned(),
    };
    trace!("parsed request-line {:?}", request_line);

    Ok(Some((request_line, idx + CRLF.len())))
}
