//! TCP line transport.
//!
//! The controller speaks plain ASCII over a single TCP socket. This module
//! only moves lines: [`connect`] opens the socket and splits it into a
//! [`LineReader`] and a [`LineWriter`] so that reading and writing can live
//! in different tasks. Retry policy, handshake and state belong to the
//! engine.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, trace};

use crate::error::Error;
use crate::protocol::DEFAULT_PORT;

/// Longest line accepted from the device, terminator included.
pub const MAX_LINE_LEN: usize = 8192;

/// Where and how to open the socket.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a single TCP connect attempt.
    pub connect_timeout: Duration,
}

impl TransportConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// `host:port` for logging and error messages.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

/// Open a TCP connection and split it into reader and writer halves.
pub async fn connect(config: &TransportConfig) -> Result<(LineReader, LineWriter), Error> {
    let addr = config.addr();
    let stream = tokio::time::timeout(
        config.connect_timeout,
        TcpStream::connect((config.host.as_str(), config.port)),
    )
    .await
    .map_err(|_| Error::ConnectTimeout {
        addr: addr.clone(),
        timeout_ms: u64::try_from(config.connect_timeout.as_millis()).unwrap_or(u64::MAX),
    })??;
    stream.set_nodelay(true)?;
    debug!(%addr, "socket connected");

    let (read_half, write_half) = stream.into_split();
    Ok((
        LineReader {
            inner: BufReader::new(read_half),
            buf: Vec::with_capacity(256),
        },
        LineWriter { inner: write_half },
    ))
}

/// Receiving half: yields one decoded line at a time.
pub struct LineReader {
    inner: BufReader<OwnedReadHalf>,
    buf: Vec<u8>,
}

impl LineReader {
    /// Read the next line without its terminator.
    ///
    /// Returns `Ok(None)` at EOF. The firmware sends Latin-1 (umlauts in
    /// shutter names), so bytes are mapped 1:1 to chars instead of being
    /// validated as UTF-8. A line longer than [`MAX_LINE_LEN`] is an error.
    pub async fn next_line(&mut self) -> Result<Option<String>, Error> {
        self.buf.clear();
        let n = (&mut self.inner)
            .take(MAX_LINE_LEN as u64)
            .read_until(b'\n', &mut self.buf)
            .await?;
        if n == 0 {
            return Ok(None);
        }
        if n == MAX_LINE_LEN && self.buf.last() != Some(&b'\n') {
            return Err(Error::LineTooLong {
                limit: MAX_LINE_LEN,
            });
        }
        let line: String = self.buf.iter().copied().map(char::from).collect();
        let line = line.trim_end_matches(['\r', '\n']).to_owned();
        trace!(%line, "received");
        Ok(Some(line))
    }
}

/// Sending half.
pub struct LineWriter {
    inner: OwnedWriteHalf,
}

impl LineWriter {
    /// Write one protocol line. The caller supplies the CRLF terminator.
    pub async fn write_line(&mut self, line: &str) -> Result<(), Error> {
        self.inner.write_all(line.as_bytes()).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Close the write side. An already-closed socket is not an error.
    pub async fn shutdown(&mut self) -> Result<(), Error> {
        match self.inner.shutdown().await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
