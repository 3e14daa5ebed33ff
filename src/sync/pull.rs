//! PULL: copy a remote file into a local sink over the sync service.
//!
//! The session stats the remote path first (so the total size is known for
//! progress accounting), issues RECV, then consumes DATA frames until DONE
//! or FAIL. A failed or cancelled pull leaves the partial local file in
//! place; cleaning up is caller policy.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use log::trace;

use crate::error::{AdbError, Result};
use crate::request::{
    ConnectionTarget, Request, StreamingRequest, TransferEvent, ValidationResponse,
};
use crate::sync::{
    self, read_stat_reply, write_path_frame, SyncTag, MAX_FILE_PACKET_LENGTH,
};
use crate::transport::{Stream, Transport};

/// Pulls `remote_path` into a newly created local file.
#[derive(Debug, Clone)]
pub struct PullFile {
    remote_path: String,
    local_path: PathBuf,
    target: ConnectionTarget,
}

impl PullFile {
    pub fn new(
        remote_path: impl Into<String>,
        local_path: impl Into<PathBuf>,
        target: ConnectionTarget,
    ) -> Self {
        Self {
            remote_path: remote_path.into(),
            local_path: local_path.into(),
            target,
        }
    }
}

impl Request for PullFile {
    fn validate(&self) -> ValidationResponse {
        sync::validate_remote_path(&self.remote_path)
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        b"sync:".to_vec()
    }
}

impl StreamingRequest for PullFile {
    type Output = ();
    type Session<S: Stream> = PullSession<S, File>;

    fn open<S: Stream>(self, transport: Transport<S>) -> Result<PullSession<S, File>> {
        // Sink first: a permission problem should surface before any sync
        // traffic goes out.
        let sink = File::create(&self.local_path)?;
        PullSession::begin(transport, &self.remote_path, sink)
    }
}

enum PullState {
    Streaming,
    Terminal,
    Finished,
}

/// One running pull. Yields monotone progress in `[0.0, 1.0]`, a terminal
/// `Progress(1.0)`, then `Done(())`. An error ends the iteration and
/// poisons the transport.
pub struct PullSession<S: Stream, W: Write> {
    transport: Transport<S>,
    sink: W,
    remote_path: String,
    total: u64,
    position: u64,
    buf: Vec<u8>,
    state: PullState,
}

impl<S: Stream, W: Write> PullSession<S, W> {
    pub(crate) fn begin(
        mut transport: Transport<S>,
        remote_path: &str,
        sink: W,
    ) -> Result<Self> {
        write_path_frame(&mut transport, SyncTag::Lstat, remote_path)?;
        let entry = read_stat_reply(&mut transport)?;
        trace!("pull {}: remote size {} bytes", remote_path, entry.size);
        write_path_frame(&mut transport, SyncTag::Recv, remote_path)?;
        Ok(Self {
            transport,
            sink,
            remote_path: remote_path.to_string(),
            total: u64::from(entry.size),
            position: 0,
            buf: vec![0u8; MAX_FILE_PACKET_LENGTH],
            state: PullState::Streaming,
        })
    }

    fn step(&mut self) -> Result<TransferEvent<()>> {
        let (tag, value) = sync::read_header(&mut self.transport)?;
        match tag {
            SyncTag::Data => {
                let len = value as usize;
                if len > MAX_FILE_PACKET_LENGTH {
                    return Err(AdbError::UnsupportedSyncProtocol(format!(
                        "DATA chunk of {} bytes exceeds the {} byte limit",
                        len, MAX_FILE_PACKET_LENGTH
                    )));
                }
                self.transport.read_exact(&mut self.buf[..len])?;
                self.sink.write_all(&self.buf[..len])?;
                self.position += len as u64;
                let progress = if self.total == 0 {
                    1.0
                } else {
                    (self.position as f64 / self.total as f64).min(1.0)
                };
                Ok(TransferEvent::Progress(progress))
            }
            SyncTag::Done => {
                self.sink.flush()?;
                self.state = PullState::Terminal;
                Ok(TransferEvent::Progress(1.0))
            }
            SyncTag::Fail => {
                let message = sync::read_fail_message(&mut self.transport, value)?;
                Err(AdbError::PullFailed {
                    path: self.remote_path.clone(),
                    message,
                })
            }
            other => Err(AdbError::UnsupportedSyncProtocol(format!(
                "unexpected {:?} frame while pulling",
                other
            ))),
        }
    }
}

impl<S: Stream, W: Write> Iterator for PullSession<S, W> {
    type Item = Result<TransferEvent<()>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            PullState::Finished => None,
            PullState::Terminal => {
                self.state = PullState::Finished;
                Some(Ok(TransferEvent::Done(())))
            }
            PullState::Streaming => match self.step() {
                Ok(event) => Some(Ok(event)),
                Err(err) => {
                    self.state = PullState::Finished;
                    self.transport.close();
                    Some(Err(err))
                }
            },
        }
    }
}
