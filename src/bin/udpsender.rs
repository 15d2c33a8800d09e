use clap::Parser;
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::net::UdpSocket;

/// Sends every line typed on stdin as a UDP datagram
#[derive(Parser)]
#[clap(version = "1.0", author = "Jeremiah C. <jeremiahcrosby@gmail.com>")]
struct Opts {
    /// Address the datagrams are sent to
    #[clap(short, long, default_value = "127.0.0.1:42069")]
    address: String,
    /// Log specification, overridden by RUST_LOG
    #[clap(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts: Opts = Opts::parse();
    let _logger = flexi_logger::Logger::with_env_or_str(&opts.log_level).start()?;

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(&opts.address)?;
    info!("Sending to {}", opts.address);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };
        let message = format!("Message received {}\n", line);
        if let Err(e) = socket.send(message.as_bytes()) {
            error!("send to {} failed: {}", opts.address, e);
            return Err(e.into());
        }
    }
}
