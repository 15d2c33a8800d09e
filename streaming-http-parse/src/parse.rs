use log::{debug, trace, warn};
use std::fmt;

use super::error::ParseError;
use super::headers::HeaderMap;
use super::request_line::{parse_request_line, HttpMethod, RequestLine};

const CONTENT_LENGTH: &str = "content-length";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParserState {
    Init,
    Headers,
    Body,
    Done,
    Error,
}
impl ParserState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ParserState::Done | ParserState::Error)
    }
}
impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserState::Init => "init",
            ParserState::Headers => "headers",
            ParserState::Body => "body",
            ParserState::Done => "done",
            ParserState::Error => "error",
        };
        f.write_str(name)
    }
}

/// A request that is filled in as bytes arrive.
///
/// Feed it the unconsumed bytes with [`HttpRequest::parse`] until
/// [`HttpRequest::is_done`] holds. Once Done or Error it never changes again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    request_line: Option<RequestLine>,
    headers: HeaderMap,
    body: Vec<u8>,
    state: ParserState,
}
impl Default for HttpRequest {
    fn default() -> Self {
        HttpRequest::new()
    }
}
impl HttpRequest {
    pub fn new() -> Self {
        HttpRequest {
            request_line: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
            state: ParserState::Init,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    pub fn method(&self) -> Option<HttpMethod> {
        self.request_line.as_ref().map(|line| line.method)
    }

    pub fn target(&self) -> Option<&str> {
        self.request_line.as_ref().map(|line| line.target.as_str())
    }

    pub fn http_version(&self) -> Option<&str> {
        self.request_line
            .as_ref()
            .map(|line| line.http_version.as_str())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_as_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Advances through every stage that `data` already holds enough bytes
    /// for and returns how many leading bytes of `data` were consumed.
    ///
    /// `data` must start at the first byte not yet consumed by an earlier
    /// call. Consumed bytes must not be passed again.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let mut read = 0;

        loop {
            let current = &data[read..];

            match self.state {
                ParserState::Error => return Err(ParseError::RequestInErrorState),
                ParserState::Done => break,
                ParserState::Init => match parse_request_line(current) {
                    Ok(Some((request_line, n))) => {
                        self.request_line = Some(request_line);
                        read += n;
                        self.transition(ParserState::Headers);
                    }
                    Ok(None) => break,
                    Err(e) => return Err(self.fail(e)),
                },
                ParserState::Headers => {
                    let (n, done) = match self.headers.parse(current) {
                        Ok(parsed) => parsed,
                        Err(e) => return Err(self.fail(e)),
                    };
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if done {
                        self.transition(ParserState::Body);
                    }
                }
                ParserState::Body => {
                    let length = self.content_length();
                    if length == 0 {
                        self.transition(ParserState::Done);
                        continue;
                    }
                    if current.len() < length {
                        break;
                    }
                    self.body = current[..length].to_vec();
                    read += length;
                    self.transition(ParserState::Done);
                }
            }
        }

        if self.state == ParserState::Done && read > 0 {
            debug!(
                "request complete: {} {} ({} headers, {} body bytes)",
                self.method().map(|m| m.as_str()).unwrap_or_default(),
                self.target().unwrap_or_default(),
                self.headers.len(),
                self.body.len()
            );
        }

        Ok(read)
    }

    /// Declared body length; absent, negative or non-numeric values count as 0.
    fn content_length(&self) -> usize {
        match self.headers.get(CONTENT_LENGTH) {
            None => 0,
            Some(value) => value.parse::<usize>().unwrap_or_else(|_| {
                warn!("ignoring unparsable content-length {:?}", value);
                0
            }),
        }
    }

    fn transition(&mut self, next: ParserState) {
        trace!("request state {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, err: ParseError) -> ParseError {
        trace!("request state {} -> {}: {}", self.state, ParserState::Error, err);
        self.state = ParserState::Error;
        err
    }
}
