use log::debug;
use std::io::{self, ErrorKind, Read};

use super::error::ParseError;
use super::parse::HttpRequest;

pub const DEFAULT_BUFFER_SIZE: usize = 1024;

#[derive(Clone, Debug)]
pub struct ReaderOptions {
    /// Starting size of the working buffer. It doubles whenever a single
    /// line or body does not fit.
    pub initial_buffer_size: usize,
    /// Largest the working buffer may grow to. A line or body that still
    /// does not fit fails the request with an `InvalidData` I/O error.
    pub max_buffer_size: Option<usize>,
}
impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            initial_buffer_size: DEFAULT_BUFFER_SIZE,
            max_buffer_size: None,
        }
    }
}

/// Bytes read from the source but not yet consumed by the request.
///
/// `data[..filled]` is unparsed input; everything before it has already been
/// handed to the request and discarded.
struct WorkingBuffer {
    data: Vec<u8>,
    filled: usize,
    limit: Option<usize>,
}
impl WorkingBuffer {
    fn new(options: &ReaderOptions) -> Self {
        let mut size = options.initial_buffer_size.max(1);
        if let Some(limit) = options.max_buffer_size {
            size = size.min(limit.max(1));
        }
        WorkingBuffer {
            data: vec![0; size],
            filled: 0,
            limit: options.max_buffer_size,
        }
    }

    fn filled(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    /// Free tail to read into, grown first if the buffer is full.
    fn unfilled_mut(&mut self) -> Result<&mut [u8], ParseError> {
        if self.filled == self.data.len() {
            let mut size = self.data.len() * 2;
            if let Some(limit) = self.limit {
                if self.data.len() >= limit {
                    return Err(ParseError::Io {
                        source: io::Error::new(
                            ErrorKind::InvalidData,
                            format!("request exceeded buffer limit of {} bytes", limit),
                        ),
                    });
                }
                size = size.min(limit);
            }
            debug!("growing request buffer to {} bytes", size);
            self.data.resize(size, 0);
        }
        Ok(&mut self.data[self.filled..])
    }

    fn advance(&mut self, n: usize) {
        self.filled += n;
    }

    /// Drops the first `n` bytes and shifts the remainder to the front.
    fn consume(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.data.copy_within(n..self.filled, 0);
        self.filled -= n;
    }
}

pub fn parse_from_reader(reader: &mut dyn Read) -> Result<HttpRequest, ParseError> {
    parse_from_reader_with(reader, &ReaderOptions::default())
}

/// Reads from `reader` until one complete request has been parsed.
///
/// End of stream before the request is complete is reported as
/// [`ParseError::UnexpectedEof`]; read errors other than `Interrupted` are
/// returned unchanged as [`ParseError::Io`].
pub fn parse_from_reader_with(
    reader: &mut dyn Read,
    options: &ReaderOptions,
) -> Result<HttpRequest, ParseError> {
    let mut request = HttpRequest::new();
    let mut buffer = WorkingBuffer::new(options);

    while !request.is_done() {
        let n = match reader.read(buffer.unfilled_mut()?) {
            Ok(0) => {
                return Err(ParseError::UnexpectedEof {
                    state: request.state(),
                })
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ParseError::Io { source: e }),
        };
        buffer.advance(n);

        let consumed = request.parse(buffer.filled())?;
        buffer.consume(consumed);
    }

    Ok(request)
}
