//! Symbol sources: a file, stdin or a UDP socket, read in chunks on the
//! reader thread and handed to the monitor loop over a bounded channel.

use std::fs::File;
use std::io::{self, Read};
use std::net::UdpSocket;
use std::sync::mpsc::SyncSender;

use anyhow::Context;

/// Largest UDP datagram accepted
const MAX_DATAGRAM: usize = 65_536;

/// Where demodulator symbols come from
#[derive(Debug)]
pub enum Source {
    File(File),
    Stdin(io::Stdin),
    Udp(UdpSocket),
}

impl Source {
    /// Open the input named on the command line. `udp` wins over `input`.
    pub fn open(input: &str, udp: Option<&str>) -> anyhow::Result<Self> {
        if let Some(addr) = udp {
            let socket = UdpSocket::bind(addr)
                .with_context(|| format!("cannot bind UDP socket to {}", addr))?;
            log::info!("Listening for symbols on udp://{}", addr);
            return Ok(Source::Udp(socket));
        }
        if input == "-" {
            log::info!("Reading symbols from stdin");
            return Ok(Source::Stdin(io::stdin()));
        }
        let file = File::open(input).with_context(|| format!("cannot open {}", input))?;
        log::info!("Reading symbols from {}", input);
        Ok(Source::File(file))
    }

    /// Chunk size to read with: datagrams are taken whole.
    pub fn chunk_size(&self, requested: usize) -> usize {
        match self {
            Source::Udp(_) => MAX_DATAGRAM,
            _ => requested,
        }
    }
}

impl Read for Source {
    /// A zero-length read means end of stream. UDP never ends on its own;
    /// empty datagrams are skipped.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::File(file) => file.read(buf),
            Source::Stdin(stdin) => stdin.lock().read(buf),
            Source::Udp(socket) => loop {
                let (n, from) = socket.recv_from(buf)?;
                if n > 0 {
                    log::trace!("{} symbols from {}", n, from);
                    return Ok(n);
                }
            },
        }
    }
}

/// Reader thread body. Reads chunks until end of stream or until the
/// consumer hangs up, and returns the number of symbols forwarded.
pub fn pump(mut source: impl Read, chunk_size: usize, tx: SyncSender<Vec<u8>>) -> io::Result<u64> {
    let mut total = 0u64;
    loop {
        let mut chunk = vec![0u8; chunk_size];
        let n = match source.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        chunk.truncate(n);
        total += n as u64;
        if tx.send(chunk).is_err() {
            log::debug!("Monitor loop gone; reader stopping");
            break;
        }
    }
    Ok(total)
}
