use custom_error::custom_error;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

custom_error! {pub NetError
    NotOpened = "TCP listener used before opened",
    IoError{source: std::io::Error} = "I/O Error: {source}"
}

pub trait RequestListener {
    fn open(&mut self) -> Result<SocketAddr, NetError>;
    fn accept_connection(&self) -> Result<(TcpStream, SocketAddr), NetError>;
}

pub struct TcpRequestListener {
    address: String,
    port: u16,
    read_timeout: Option<Duration>,
    listener: Option<TcpListener>,
}

impl TcpRequestListener {
    pub fn new(address: &str, port: u16) -> Self {
        TcpRequestListener {
            address: address.to_owned(),
            port,
            read_timeout: None,
            listener: None,
        }
    }

    /// Reads on accepted connections fail once they block for longer than
    /// `timeout`, which aborts the request being parsed.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl RequestListener for TcpRequestListener {
    fn open(&mut self) -> Result<SocketAddr, NetError> {
        let opened = TcpListener::bind((self.address.as_str(), self.port))
            .map_err(|e| NetError::IoError { source: e })?;
        let local = opened
            .local_addr()
            .map_err(|e| NetError::IoError { source: e })?;
        self.listener = Some(opened);
        Ok(local)
    }

    fn accept_connection(&self) -> Result<(TcpStream, SocketAddr), NetError> {
        let listener = match self.listener {
            Some(ref listener) => listener,
            None => return Err(NetError::NotOpened),
        };

        let (stream, peer) = listener
            .accept()
            .map_err(|e| NetError::IoError { source: e })?;
        stream
            .set_read_timeout(self.read_timeout)
            .map_err(|e| NetError::IoError { source: e })?;
        Ok((stream, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::thread;
    use streaming_http_parse::{parse_from_reader, HttpMethod};

    #[test]
    fn accept_before_open_fails() {
        let listener = TcpRequestListener::new("127.0.0.1", 0);
        assert!(matches!(
            listener.accept_connection(),
            Err(NetError::NotOpened)
        ));
    }

    #[test]
    fn parses_request_from_accepted_connection() {
        let mut listener = TcpRequestListener::new("127.0.0.1", 0)
            .with_read_timeout(Some(Duration::from_secs(5)));
        let local = listener.open().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(local).unwrap();
            for part in &["PATCH /pot HT", "TP/1.1\r\nContent-Le", "ngth: 4\r\n\r\nbr", "ew"] {
                stream.write_all(part.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
        });

        let (mut stream, _) = listener.accept_connection().unwrap();
        let request = parse_from_reader(&mut stream).unwrap();
        client.join().unwrap();

        assert_eq!(Some(HttpMethod::PATCH), request.method());
        assert_eq!(Some("/pot"), request.target());
        assert_eq!(b"brew", request.body());
    }
}
