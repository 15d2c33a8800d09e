mod net;

use clap::Parser;
use log::{error, info};
use std::time::Duration;
use streaming_http_parse::{
    parse_from_reader_with, HttpRequest, ReaderOptions, DEFAULT_BUFFER_SIZE,
};

use net::{RequestListener, TcpRequestListener};

/// Accepts TCP connections and prints the HTTP/1.1 request read from each one
#[derive(Parser)]
#[clap(version = "1.0", author = "Jeremiah C. <jeremiahcrosby@gmail.com>")]
struct Opts {
    /// IP address to bind to
    #[clap(short, long, default_value = "127.0.0.1")]
    bind_address: String,
    /// Port to listen on
    #[clap(short, long, default_value = "42069")]
    port: u16,
    /// Initial size in bytes of the per-connection read buffer
    #[clap(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,
    /// Reject requests whose line, header or body outgrows this many bytes
    #[clap(long)]
    max_buffer_size: Option<usize>,
    /// Abort a request when the client sends nothing for this many seconds
    #[clap(long)]
    read_timeout_secs: Option<u64>,
    /// Log specification, overridden by RUST_LOG
    #[clap(long, default_value = "info")]
    log_level: String,
}

fn print_request(request: &HttpRequest) {
    if let Some(line) = request.request_line() {
        println!("Request Line:");
        println!("- Method: {}", line.method);
        println!("- Target: {}", line.target);
        println!("- Version: {}", line.http_version);
    }

    println!("Headers:");
    let mut headers: Vec<_> = request.headers().iter().collect();
    headers.sort();
    for (name, value) in headers {
        println!("- {}: {}", name, value);
    }

    println!("Body:");
    println!("{}", request.body_as_string());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts: Opts = Opts::parse();
    let _logger = flexi_logger::Logger::with_env_or_str(&opts.log_level).start()?;

    let options = ReaderOptions {
        initial_buffer_size: opts.buffer_size,
        max_buffer_size: opts.max_buffer_size,
    };
    let mut listener = TcpRequestListener::new(&opts.bind_address, opts.port)
        .with_read_timeout(opts.read_timeout_secs.map(Duration::from_secs));
    let local = listener.open()?;
    info!("Listening on {}", local);

    loop {
        let (mut stream, peer) = match listener.accept_connection() {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("accept failed: {}", e);
                continue;
            }
        };
        info!("Connection accepted from {}", peer);

        match parse_from_reader_with(&mut stream, &options) {
            Ok(request) => print_request(&request),
            Err(e) => error!("could not read request from {}: {}", peer, e),
        }
        info!("Connection to {} closed", peer);
    }
}
