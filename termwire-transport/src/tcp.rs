//! TCP channel

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use termwire_core::constants::{
    DEFAULT_READ_TIMEOUT, DEFAULT_TIMEOUT, LRC_LEN, MAX_FRAME_SIZE, STX,
};
use termwire_core::framer;

use crate::{error::*, DeviceChannel};

/// TCP channel to a terminal listening in raw socket mode
pub struct TcpChannel {
    addr: String,
    port: u16,
    socket_addr: Option<SocketAddr>,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
    read_timeout: Duration,
    trailer_len: usize,
}

impl TcpChannel {
    /// Create new TCP channel
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            socket_addr: None,
            stream: None,
            connect_timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT),
            trailer_len: LRC_LEN,
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set read timeout (covers the whole response, not each read)
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Bytes expected after ETX (1 for LRC, 0 for terminals that send none)
    pub fn with_trailer_len(mut self, len: usize) -> Self {
        self.trailer_len = len;
        self
    }

    /// Resolve address to SocketAddr
    async fn resolve_addr(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.socket_addr {
            return Ok(addr);
        }

        let addr_str = format!("{}:{}", self.addr, self.port);

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?
            .collect();

        let addr = addrs
            .first()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))?;

        self.socket_addr = Some(*addr);
        Ok(*addr)
    }
}

/// Length of a complete frame plus trailer at the start of `buf`
///
/// Bytes ahead of STX (ACK, line noise) are dropped first.
fn complete_len(buf: &mut BytesMut, trailer_len: usize) -> Option<usize> {
    match buf.iter().position(|&b| b == STX) {
        Some(0) => {}
        Some(start) => {
            trace!("Skipping {} bytes before STX", start);
            buf.advance(start);
        }
        None => {
            buf.clear();
            return None;
        }
    }

    let end = framer::frame_end(buf)? + trailer_len;
    (buf.len() >= end).then_some(end)
}

/// Read until one complete frame (plus trailer) is buffered
async fn read_frame(stream: &mut TcpStream, trailer_len: usize) -> Result<BytesMut> {
    let mut buf = BytesMut::with_capacity(1024);

    loop {
        if let Some(len) = complete_len(&mut buf, trailer_len) {
            if buf.len() > len {
                warn!("Discarding {} bytes after frame", buf.len() - len);
            }
            buf.truncate(len);
            return Ok(buf);
        }

        if buf.len() >= MAX_FRAME_SIZE {
            return Err(Error::FrameTooLarge { max: MAX_FRAME_SIZE });
        }

        let n = stream.read_buf(&mut buf).await?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
    }
}

#[async_trait]
impl DeviceChannel for TcpChannel {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.resolve_addr().await?;

        debug!("Connecting to {}...", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(Error::Io)?;

        // Frames are small and latency-bound
        stream.set_nodelay(true)?;

        debug!("Connected to {}", addr);

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Disconnecting from {}...", self.remote_addr());

            let _ = stream.shutdown().await;
        }

        self.socket_addr = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes: {}", data.len(), framer::render(data));

        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    async fn receive(&mut self) -> Result<BytesMut> {
        let trailer_len = self.trailer_len;
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let buf = timeout(self.read_timeout, read_frame(stream, trailer_len))
            .await
            .map_err(|_| Error::ReadTimeout)??;

        trace!("Received {} bytes: {}", buf.len(), framer::render(&buf));

        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        self.socket_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.addr, self.port))
    }
}

impl Drop for TcpChannel {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("TCP channel dropped while still connected");
        }
    }
}
