use custom_error::custom_error;

use super::parse::ParserState;

custom_error! {pub ParseError
    MalformedRequestLine{line: String} = "malformed request-line: {line:?}",
    MalformedFieldLine{line: String} = "malformed field-line: {line:?}",
    RequestInErrorState = "request in error state",
    UnexpectedEof{state: ParserState} = "unexpected end of stream while in {state} state",
    Io{source: std::io::Error} = "I/O error: {source}"
}

impl ParseError {
    pub(crate) fn malformed_request_line(line: &[u8]) -> Self {
        ParseError::MalformedRequestLine {
            line: String::from_utf8_lossy(line).into_owned(),
        }
    }

    pub(crate) fn malformed_field_line(line: &[u8]) -> Self {
        ParseError::MalformedFieldLine {
            line: String::from_utf8_lossy(line).into_owned(),
        }
    }
}
