// Copyright (C) 2025 HasX
// Licensed under the GNU AGPL v3.0. See LICENSE file for details.
// Website: https://hasx.dev

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};

use crate::error::{AdbError, Result};
use crate::wire;

/// A duplex byte stream the protocol can run over. `TcpStream` is the
/// production implementation; tests substitute a scripted double.
pub trait Stream: Read + Write {
    /// Half-close: signal EOF to the peer while keeping the read side open.
    fn shutdown_write(&mut self) -> std::io::Result<()>;
    /// Full shutdown of both directions.
    fn shutdown_both(&mut self) -> std::io::Result<()>;
}

impl Stream for TcpStream {
    fn shutdown_write(&mut self) -> std::io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Write)
    }

    fn shutdown_both(&mut self) -> std::io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Cancels an in-flight request: sets the shared flag and shuts the socket
/// down so blocked reads and writes return immediately. The peer's state is
/// indeterminate afterwards, so the transport must be discarded.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    socket: Arc<TcpStream>,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let _ = self.socket.shutdown(Shutdown::Both);
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.flag.load(Ordering::SeqCst))
            .finish()
    }
}

/// One request's view of the socket. No buffering beyond the OS; every
/// operation either completes fully or fails.
pub struct Transport<S: Stream = TcpStream> {
    stream: S,
    cancelled: Arc<AtomicBool>,
    closed: bool,
}

impl Transport<TcpStream> {
    pub fn connect(addr: SocketAddr) -> Result<Self> {
        trace!("connecting to adb server at {}", addr);
        let stream = TcpStream::connect(addr)?;
        Ok(Self::new(stream))
    }

    /// Applies a caller-supplied deadline to both directions. The library
    /// itself imposes no timeouts.
    pub fn set_timeouts(&mut self, dur: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(dur)?;
        self.stream.set_write_timeout(dur)?;
        Ok(())
    }

    pub fn cancel_token(&self) -> Result<CancelToken> {
        Ok(CancelToken {
            flag: Arc::clone(&self.cancelled),
            socket: Arc::new(self.stream.try_clone()?),
        })
    }
}

impl<S: Stream> Transport<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            cancelled: Arc::new(AtomicBool::new(false)),
            closed: false,
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            Err(AdbError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Maps an I/O failure observed after cancellation to `Cancelled`: the
    /// error we got is just the shutdown racing the operation.
    fn cancelled_or(&self, err: AdbError) -> AdbError {
        if self.cancelled.load(Ordering::SeqCst) {
            AdbError::Cancelled
        } else {
            err
        }
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.check_cancelled()?;
        self.stream
            .write_all(bytes)
            .map_err(|e| self.cancelled_or(AdbError::WriteFailed(e)))
    }

    /// Reads exactly `buf.len()` bytes or fails. EOF mid-read is a
    /// `ShortRead`, not an I/O error.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.check_cancelled()?;
        let wanted = buf.len();
        let mut got = 0;
        while got < wanted {
            let n = self
                .stream
                .read(&mut buf[got..])
                .map_err(|e| self.cancelled_or(AdbError::Io(e)))?;
            if n == 0 {
                return Err(self.cancelled_or(AdbError::ShortRead { wanted, got }));
            }
            got += n;
        }
        Ok(())
    }

    /// Reads whatever is available, up to `buf.len()` bytes. Returns the
    /// count; 0 means the peer closed the stream.
    pub fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_cancelled()?;
        self.stream
            .read(buf)
            .map_err(|e| self.cancelled_or(AdbError::Io(e)))
    }

    /// Signals EOF on the write side; the read side stays usable. The
    /// install pipeline relies on this to mark the end of the payload.
    pub fn half_close(&mut self) -> Result<()> {
        self.check_cancelled()?;
        self.stream
            .shutdown_write()
            .map_err(|e| self.cancelled_or(AdbError::Io(e)))
    }

    /// Idempotent half-close followed by full close.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.stream.shutdown_write();
        let _ = self.stream.shutdown_both();
    }
}

impl<S: Stream> Drop for Transport<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reads one hex-length-prefixed body, the server's framing for replies
/// that carry data (version, device list, feature list).
pub fn read_framed<S: Stream>(transport: &mut Transport<S>) -> Result<Vec<u8>> {
    let mut header = [0u8; 4];
    transport.read_exact(&mut header)?;
    let len = wire::parse_hex_len(&header)?;
    let mut body = vec![0u8; len];
    if len > 0 {
        transport.read_exact(&mut body)?;
    }
    Ok(body)
}

/// The status arbiter. Every control-channel request is answered by
/// exactly one 4-byte status; on FAIL the server appends a framed error
/// message and closes the connection.
pub fn expect_okay<S: Stream>(transport: &mut Transport<S>) -> Result<()> {
    let mut status = [0u8; 4];
    transport.read_exact(&mut status)?;
    if &status == wire::OKAY {
        Ok(())
    } else if &status == wire::FAIL {
        let message = read_framed(transport)?;
        debug!("server rejected request: {}", String::from_utf8_lossy(&message));
        Err(AdbError::RequestRejected(
            String::from_utf8_lossy(&message).into_owned(),
        ))
    } else {
        Err(AdbError::UnexpectedTransportResponse(hex::encode(status)))
    }
}
