//! Incremental HTTP/1.1 request parsing over a blocking byte source.
//!
//! [`parse_from_reader`] pulls chunks of any size from a [`std::io::Read`],
//! feeds them to an [`HttpRequest`] and returns once the request line, the
//! headers and a `Content-Length` body have all arrived.

mod error;
mod headers;
mod parse;
mod reader;
mod request_line;

pub use self::error::ParseError;
pub use self::headers::HeaderMap;
pub use self::parse::{HttpRequest, ParserState};
pub use self::reader::{
    parse_from_reader, parse_from_reader_with, ReaderOptions, DEFAULT_BUFFER_SIZE,
};
pub use self::request_line::{parse_request_line, HttpMethod, RequestLine};
