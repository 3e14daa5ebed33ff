//! PUSH: stream a local file to a remote path over the sync service.
//!
//! One 64 KiB buffer serves the whole session; each DATA header is written
//! into the first 8 bytes of that buffer so a chunk leaves in a single
//! write. After the source runs dry the session sends DONE with the file's
//! mtime and waits for the device's OKAY.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use log::trace;

use crate::error::{AdbError, Result};
use crate::request::{
    ConnectionTarget, Request, StreamingRequest, TransferEvent, ValidationResponse,
};
use crate::sync::{self, encode_header, write_path_frame, SyncTag, MAX_FILE_PACKET_LENGTH};
use crate::transport::{Stream, Transport};

/// Pushes a local file to `remote_path`.
#[derive(Debug, Clone)]
pub struct PushFile {
    local_path: PathBuf,
    remote_path: String,
    mode: Option<u32>,
    target: ConnectionTarget,
}

impl PushFile {
    pub fn new(
        local_path: impl Into<PathBuf>,
        remote_path: impl Into<String>,
        target: ConnectionTarget,
    ) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
            mode: None,
            target,
        }
    }

    /// Overrides the permission bits sent with SEND. Defaults to the local
    /// file's mode on Unix and 0o644 elsewhere.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    fn effective_mode(&self, metadata: &std::fs::Metadata) -> u32 {
        self.mode.unwrap_or_else(|| default_mode(metadata))
    }
}

#[cfg(unix)]
fn default_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn default_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}

impl Request for PushFile {
    fn validate(&self) -> ValidationResponse {
        if !self.local_path.is_file() {
            return ValidationResponse::invalid(format!(
                "{} does not exist or is not a regular file",
                self.local_path.display()
            ));
        }
        sync::validate_remote_path(&self.remote_path)
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        b"sync:".to_vec()
    }
}

impl StreamingRequest for PushFile {
    type Output = ();
    type Session<S: Stream> = PushSession<S, File>;

    fn open<S: Stream>(self, transport: Transport<S>) -> Result<PushSession<S, File>> {
        let source = File::open(&self.local_path)?;
        let metadata = source.metadata()?;
        let mtime = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        PushSession::begin(
            transport,
            &self.remote_path,
            source,
            metadata.len(),
            self.effective_mode(&metadata),
            mtime,
        )
    }
}

enum PushState {
    Streaming,
    Terminal,
    Finished,
}

/// One running push. Yields monotone progress, a terminal `Progress(1.0)`
/// once the device acknowledges DONE, then `Done(())`.
pub struct PushSession<S: Stream, R: Read> {
    transport: Transport<S>,
    source: R,
    total: u64,
    sent: u64,
    mtime: u32,
    buf: Vec<u8>,
    state: PushState,
}

impl<S: Stream, R: Read> PushSession<S, R> {
    pub(crate) fn begin(
        mut transport: Transport<S>,
        remote_path: &str,
        source: R,
        total: u64,
        mode: u32,
        mtime: u32,
    ) -> Result<Self> {
        // SEND takes "<path>,<mode>" with the permission bits in decimal.
        let argument = format!("{},{}", remote_path, mode & 0o777);
        trace!("push to {}: {} bytes", remote_path, total);
        write_path_frame(&mut transport, SyncTag::Send, &argument)?;
        Ok(Self {
            transport,
            source,
            total,
            sent: 0,
            mtime,
            buf: vec![0u8; 8 + MAX_FILE_PACKET_LENGTH],
            state: PushState::Streaming,
        })
    }

    fn finish(&mut self) -> Result<()> {
        let mut done = [0u8; 8];
        encode_header(&mut done, SyncTag::Done, self.mtime);
        self.transport.write_all(&done)?;
        match sync::read_header(&mut self.transport)? {
            (SyncTag::Okay, _) => Ok(()),
            (SyncTag::Fail, len) => {
                let message = sync::read_fail_message(&mut self.transport, len)?;
                Err(AdbError::PushFailed(message))
            }
            (other, _) => Err(AdbError::UnsupportedSyncProtocol(format!(
                "unexpected {:?} frame after DONE",
                other
            ))),
        }
    }

    fn step(&mut self) -> Result<TransferEvent<()>> {
        let n = self.source.read(&mut self.buf[8..])?;
        if n == 0 {
            self.finish()?;
            self.state = PushState::Terminal;
            return Ok(TransferEvent::Progress(1.0));
        }
        encode_header(&mut self.buf, SyncTag::Data, n as u32);
        let frame_len = 8 + n;
        self.transport.write_all(&self.buf[..frame_len])?;
        self.sent += n as u64;
        let progress = if self.total == 0 {
            1.0
        } else {
            (self.sent as f64 / self.total as f64).min(1.0)
        };
        Ok(TransferEvent::Progress(progress))
    }
}

impl<S: Stream, R: Read> Iterator for PushSession<S, R> {
    type Item = Result<TransferEvent<()>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            PushState::Finished => None,
            PushState::Terminal => {
                self.state = PushState::Finished;
                Some(Ok(TransferEvent::Done(())))
            }
            PushState::Streaming => match self.step() {
                Ok(event) => Some(Ok(event)),
                Err(err) => {
                    self.state = PushState::Finished;
                    self.transport.close();
                    Some(Err(err))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::drain;
    use crate::sync::pull::PullSession;
    use crate::test_stream::ScriptedStream;
    use std::io::Cursor;

    fn okay_reply() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"OKAY");
        out.extend_from_slice(&0u32.to_le_bytes());
        out
    }

    #[test]
    fn push_chunks_and_acknowledges() {
        let payload: Vec<u8> = (0..65536 + 200).map(|i| (i % 251) as u8).collect();
        let (stream, capture) = ScriptedStream::with_capture(&okay_reply());
        let session = PushSession::begin(
            Transport::new(stream),
            "/data/local/tmp/blob",
            Cursor::new(payload.clone()),
            payload.len() as u64,
            0o644,
            1_700_000_123,
        )
        .unwrap();

        let mut progress = Vec::new();
        let mut done = false;
        for event in session {
            match event.unwrap() {
                TransferEvent::Progress(p) => progress.push(p),
                TransferEvent::Done(()) => done = true,
            }
        }
        assert!(done);
        assert_eq!(progress[0], 65536.0 / 65736.0);
        assert_eq!(progress[1], 1.0);
        assert_eq!(*progress.last().unwrap(), 1.0);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));

        let written = capture.bytes();
        let argument = b"/data/local/tmp/blob,420";
        let mut expected = Vec::new();
        expected.extend_from_slice(b"SEND");
        expected.extend_from_slice(&(argument.len() as u32).to_le_bytes());
        expected.extend_from_slice(argument);
        expected.extend_from_slice(b"DATA");
        expected.extend_from_slice(&65536u32.to_le_bytes());
        expected.extend_from_slice(&payload[..65536]);
        expected.extend_from_slice(b"DATA");
        expected.extend_from_slice(&200u32.to_le_bytes());
        expected.extend_from_slice(&payload[65536..]);
        expected.extend_from_slice(b"DONE");
        expected.extend_from_slice(&1_700_000_123u32.to_le_bytes());
        assert_eq!(written, expected);
    }

    #[test]
    fn empty_file_skips_data_frames() {
        let (stream, capture) = ScriptedStream::with_capture(&okay_reply());
        let session = PushSession::begin(
            Transport::new(stream),
            "/data/local/tmp/empty",
            Cursor::new(Vec::new()),
            0,
            0o600,
            7,
        )
        .unwrap();
        let events: Vec<_> = session.map(|e| e.unwrap()).collect();
        assert_eq!(
            events,
            vec![TransferEvent::Progress(1.0), TransferEvent::Done(())]
        );

        let written = capture.bytes();
        let argument = b"/data/local/tmp/empty,384";
        let mut expected = Vec::new();
        expected.extend_from_slice(b"SEND");
        expected.extend_from_slice(&(argument.len() as u32).to_le_bytes());
        expected.extend_from_slice(argument);
        expected.extend_from_slice(b"DONE");
        expected.extend_from_slice(&7u32.to_le_bytes());
        assert_eq!(written, expected);
    }

    #[test]
    fn device_fail_becomes_push_failed() {
        let message = b"permission denied";
        let mut reply = Vec::new();
        reply.extend_from_slice(b"FAIL");
        reply.extend_from_slice(&(message.len() as u32).to_le_bytes());
        reply.extend_from_slice(message);
        let mut session = PushSession::begin(
            Transport::new(ScriptedStream::replying(&reply)),
            "/system/blob",
            Cursor::new(Vec::new()),
            0,
            0o644,
            0,
        )
        .unwrap();
        match session.next().unwrap().unwrap_err() {
            AdbError::PushFailed(msg) => assert_eq!(msg, "permission denied"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(session.next().is_none());
    }

    #[test]
    fn pull_of_a_push_is_byte_identical() {
        let payload: Vec<u8> = (0..70_000).map(|i| (i * 7 % 256) as u8).collect();
        let (stream, capture) = ScriptedStream::with_capture(&okay_reply());
        let session = PushSession::begin(
            Transport::new(stream),
            "/t",
            Cursor::new(payload.clone()),
            payload.len() as u64,
            0o644,
            0,
        )
        .unwrap();
        drain(session).unwrap();

        // Replay the pushed DATA/DONE frames as a pull script.
        let written = capture.bytes();
        let send_frame_len = {
            let arg_len = u32::from_le_bytes(written[4..8].try_into().unwrap()) as usize;
            8 + arg_len
        };
        let mut script = Vec::new();
        script.extend_from_slice(b"LSTA");
        script.extend_from_slice(&0o100644u32.to_le_bytes());
        script.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        script.extend_from_slice(&0u32.to_le_bytes());
        script.extend_from_slice(&written[send_frame_len..]);

        let mut sink = Vec::new();
        let pull = PullSession::begin(
            Transport::new(ScriptedStream::replying(&script)),
            "/t",
            &mut sink,
        )
        .unwrap();
        drain(pull).unwrap();
        assert_eq!(sink, payload);
    }
}
