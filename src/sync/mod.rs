//! The sync sub-protocol: file stat, pull, and push. Entered by issuing
//! `sync:` on the control channel; afterwards every message is an 8-byte
//! header (4 ASCII tag bytes + little-endian u32) followed by exactly as
//! many payload bytes as the integer says. Little-endian here, ASCII hex
//! on the control channel; the two framings never mix.

pub mod pull;
pub mod push;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::error::{AdbError, Result};
use crate::request::{ComplexRequest, ConnectionTarget, Request, ValidationResponse};
use crate::transport::{Stream, Transport};

/// Data chunks larger than this are a protocol violation on either side.
pub const MAX_FILE_PACKET_LENGTH: usize = 64 * 1024;

/// Remote paths are limited to this many UTF-8 bytes.
pub const MAX_REMOTE_PATH_LENGTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTag {
    Stat,
    Lstat,
    Recv,
    Send,
    Data,
    Done,
    Okay,
    Fail,
}

impl SyncTag {
    pub fn bytes(self) -> [u8; 4] {
        match self {
            SyncTag::Stat => *b"STAT",
            SyncTag::Lstat => *b"LSTA",
            SyncTag::Recv => *b"RECV",
            SyncTag::Send => *b"SEND",
            SyncTag::Data => *b"DATA",
            SyncTag::Done => *b"DONE",
            SyncTag::Okay => *b"OKAY",
            SyncTag::Fail => *b"FAIL",
        }
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Result<Self> {
        match &bytes {
            b"STAT" => Ok(SyncTag::Stat),
            b"LSTA" => Ok(SyncTag::Lstat),
            b"RECV" => Ok(SyncTag::Recv),
            b"SEND" => Ok(SyncTag::Send),
            b"DATA" => Ok(SyncTag::Data),
            b"DONE" => Ok(SyncTag::Done),
            b"OKAY" => Ok(SyncTag::Okay),
            b"FAIL" => Ok(SyncTag::Fail),
            _ => Err(AdbError::UnexpectedTag(hex::encode(bytes))),
        }
    }
}

/// Serializes a header into the first 8 bytes of `buf`. Data chunks write
/// their header into the same buffer as the payload so each chunk goes out
/// in one write.
pub(crate) fn encode_header(buf: &mut [u8], tag: SyncTag, value: u32) {
    buf[..4].copy_from_slice(&tag.bytes());
    LittleEndian::write_u32(&mut buf[4..8], value);
}

pub(crate) fn read_header<S: Stream>(transport: &mut Transport<S>) -> Result<(SyncTag, u32)> {
    let mut header = [0u8; 8];
    transport.read_exact(&mut header)?;
    let mut tag = [0u8; 4];
    tag.copy_from_slice(&header[..4]);
    let value = LittleEndian::read_u32(&header[4..8]);
    Ok((SyncTag::from_bytes(tag)?, value))
}

/// Writes `tag` + path length + path bytes as one frame (the shape of
/// LSTA, RECV and SEND requests).
pub(crate) fn write_path_frame<S: Stream>(
    transport: &mut Transport<S>,
    tag: SyncTag,
    path: &str,
) -> Result<()> {
    let mut frame = vec![0u8; 8 + path.len()];
    encode_header(&mut frame, tag, path.len() as u32);
    frame[8..].copy_from_slice(path.as_bytes());
    transport.write_all(&frame)
}

/// Reads the sync-level FAIL payload: the header's integer is the message
/// length.
pub(crate) fn read_fail_message<S: Stream>(
    transport: &mut Transport<S>,
    len: u32,
) -> Result<String> {
    let mut message = vec![0u8; len as usize];
    transport.read_exact(&mut message)?;
    Ok(String::from_utf8_lossy(&message).into_owned())
}

pub(crate) fn validate_remote_path(path: &str) -> ValidationResponse {
    if path.is_empty() {
        ValidationResponse::invalid("remote path is empty")
    } else if path.len() > MAX_REMOTE_PATH_LENGTH {
        ValidationResponse::invalid(format!(
            "remote path is {} bytes, limit is {}",
            path.len(),
            MAX_REMOTE_PATH_LENGTH
        ))
    } else {
        ValidationResponse::valid()
    }
}

/// What LSTAT reports about a remote file. A zero size is a valid empty
/// file; a missing file comes back all-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub mode: u32,
    pub size: u32,
    pub mtime: u32,
}

/// Stats a remote path over the sync service.
#[derive(Debug, Clone)]
pub struct StatFile {
    remote_path: String,
    target: ConnectionTarget,
}

impl StatFile {
    pub fn new(remote_path: impl Into<String>, target: ConnectionTarget) -> Self {
        Self { remote_path: remote_path.into(), target }
    }
}

impl Request for StatFile {
    fn validate(&self) -> ValidationResponse {
        validate_remote_path(&self.remote_path)
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        b"sync:".to_vec()
    }
}

impl ComplexRequest for StatFile {
    type Output = FileEntry;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<FileEntry> {
        write_path_frame(transport, SyncTag::Lstat, &self.remote_path)?;
        read_stat_reply(transport)
    }
}

/// Reads the 16-byte LSTA reply: tag, mode, size, mtime.
pub(crate) fn read_stat_reply<S: Stream>(transport: &mut Transport<S>) -> Result<FileEntry> {
    let (tag, mode) = read_header(transport)?;
    if tag != SyncTag::Lstat {
        return Err(AdbError::UnsupportedSyncProtocol(format!(
            "expected LSTA reply, got {:?}",
            tag
        )));
    }
    let mut rest = [0u8; 8];
    transport.read_exact(&mut rest)?;
    Ok(FileEntry {
        mode,
        size: LittleEndian::read_u32(&rest[..4]),
        mtime: LittleEndian::read_u32(&rest[4..8]),
    })
}
