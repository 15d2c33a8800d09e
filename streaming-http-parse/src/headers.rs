use lazy_static::lazy_static;
use log::trace;
use regex::bytes::Regex;
use std::collections::HashMap;

use super::error::ParseError;
use super::request_line::{find_crlf, CRLF};

const TOKEN_REGEX_STR: &str = r"^[!#$%&'*+\-.^_`|~a-zA-Z0-9]+$";

/// Header fields keyed by lower-cased name.
///
/// A name seen more than once keeps every value, joined with `,` in the order
/// the lines arrived.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    fields: HashMap<String, String>,
}
impl HeaderMap {
    pub fn new() -> Self {
        HeaderMap {
            fields: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_ascii_lowercase())
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.fields.get_mut(&name) {
            Some(existing) => {
                existing.push(',');
                existing.push_str(value);
            }
            None => {
                self.fields.insert(name, value.to_owned());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Consumes as many complete field lines from `data` as are available.
    ///
    /// Returns the number of bytes consumed and whether the empty line ending
    /// the header section was reached (its CRLF is counted as consumed).
    /// Lines applied before a malformed one stay in the map.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let mut read = 0;

        loop {
            let idx = match find_crlf(&data[read..]) {
                Some(idx) => idx,
                None => return Ok((read, false)),
            };

            if idx == 0 {
                read += CRLF.len();
                return Ok((read, true));
            }

            let (name, value) = parse_field_line(&data[read..read + idx])?;
            trace!("parsed field-line {}: {:?}", name, value);
            self.insert(&name, &value);
            read += idx + CRLF.len();
        }
    }
}

fn parse_field_line(line: &[u8]) -> Result<(String, String), ParseError> {
    lazy_static! {
        static ref FIELD_NAME_RE: Regex = Regex::new(TOKEN_REGEX_STR).unwrap();
    }

    let colon = match line.iter().position(|&b| b == b':') {
        Some(colon) => colon,
        None => return Err(ParseError::malformed_field_line(line)),
    };

    let name = &line[..colon];
    let name_start = name
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(name.len());
    let name = &name[name_start..];

    // whitespace between the name and the colon is never allowed
    if !FIELD_NAME_RE.is_match(name) {
        return Err(ParseError::malformed_field_line(line));
    }

    let value = String::from_utf8_lossy(&line[colon + 1..]);

    Ok((
        String::from_utf8_lossy(name).into_owned(),
        value.trim().to_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_malformed(data: &str) {
        let mut headers = HeaderMap::new();
        match headers.parse(data.as_bytes()) {
            Err(ParseError::MalformedFieldLine { .. }) => {}
            other => panic!("expected malformed field-line for {:?}, got {:?}", data, other),
        }
    }

    #[test]
    fn parses_single_header() {
        let mut headers = HeaderMap::new();
        let (read, done) = headers.parse(b"Host: localhost:42069\r\n\r\n").unwrap();

        assert_eq!(Some("localhost:42069"), headers.get("Host"));
        assert_eq!(25, read);
        assert!(done);
    }

    #[test]
    fn trims_whitespace_around_value_and_before_name() {
        let mut headers = HeaderMap::new();
        let data = "         Host: localhost:42069            \r\n\r\n";
        let (read, done) = headers.parse(data.as_bytes()).unwrap();

        assert_eq!(Some("localhost:42069"), headers.get("host"));
        assert_eq!(46, read);
        assert!(done);
    }

    #[test]
    fn parses_two_headers() {
        let mut headers = HeaderMap::new();
        let (read, done) = headers
            .parse(b"Host: localhost:42069\r\n    Foo: bar  \r\n\r\n")
            .unwrap();

        assert_eq!(Some("localhost:42069"), headers.get("Host"));
        assert_eq!(Some("bar"), headers.get("Foo"));
        assert_eq!(2, headers.len());
        assert_eq!(41, read);
        assert!(done);
    }

    #[test]
    fn folds_repeated_names() {
        let mut headers = HeaderMap::new();
        let data = "Host: localhost:42069\r\nSet-Person: abhishek\r\nSet-Person: prithvi\r\nSet-Person: singh\r\n\r\n";
        let (read, done) = headers.parse(data.as_bytes()).unwrap();

        assert_eq!(Some("abhishek,prithvi,singh"), headers.get("set-person"));
        assert_eq!(Some("abhishek,prithvi,singh"), headers.get("SET-PERSON"));
        assert_eq!(87, read);
        assert!(done);
    }

    #[test]
    fn folds_across_calls() {
        let mut headers = HeaderMap::new();
        assert_eq!((11, false), headers.parse(b"Accept: a\r\nAcc").unwrap());
        assert_eq!((16, true), headers.parse(b"ACCEPT: b, c\r\n\r\n").unwrap());
        assert_eq!(Some("a,b, c"), headers.get("accept"));
    }

    #[test]
    fn stops_at_incomplete_line() {
        let mut headers = HeaderMap::new();
        assert_eq!((0, false), headers.parse(b"Host: localhost").unwrap());
        assert_eq!((0, false), headers.parse(b"").unwrap());
        assert!(headers.is_empty());

        let (read, done) = headers.parse(b"Host: a\r\nUser-Agent: cu").unwrap();
        assert_eq!((9, false), (read, done));
        assert_eq!(Some("a"), headers.get("host"));
        assert!(!headers.contains("user-agent"));
    }

    #[test]
    fn empty_line_alone_ends_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!((2, true), headers.parse(b"\r\nbody").unwrap());
        assert!(headers.is_empty());
    }

    #[test]
    fn rejects_space_before_colon() {
        assert_malformed("     Host  : localhost:42069\r\n\r\n");
        assert_malformed("Host : x\r\n");
        assert_malformed("Host\t: x\r\n");
    }

    #[test]
    fn rejects_missing_colon() {
        assert_malformed("Host localhost:42069\r\n\r\n");
    }

    #[test]
    fn rejects_non_token_names() {
        assert_malformed("H\u{c2}\u{a9}st: localhost:42069\r\n\r\n");
        assert_malformed(": no-name\r\n");
        assert_malformed("Ho st: x\r\n");
    }

    #[test]
    fn keeps_lines_applied_before_an_error() {
        let mut headers = HeaderMap::new();
        assert!(headers.parse(b"Foo: bar\r\nBad line\r\n").is_err());
        assert_eq!(Some("bar"), headers.get("foo"));
    }

    #[test]
    fn value_may_contain_colons_and_be_empty() {
        let mut headers = HeaderMap::new();
        headers.parse(b"X-Empty:\r\nReferer: http://a:1/b\r\n").unwrap();
        assert_eq!(Some(""), headers.get("x-empty"));
        assert_eq!(Some("http://a:1/b"), headers.get("referer"));
    }
}
