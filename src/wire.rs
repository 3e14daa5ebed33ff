//! Control-channel framing: `NNNN<body>` where NNNN is the body length in
//! bytes as four uppercase hex digits. Sync-mode framing lives in
//! [`crate::sync`]; the two do not share length encodings.

use crate::error::{AdbError, Result};

pub const OKAY: &[u8; 4] = b"OKAY";
pub const FAIL: &[u8; 4] = b"FAIL";

/// Frames a control-channel payload. Bit-exact: no padding beyond the
/// 4-digit length, no separators.
pub fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(format!("{:04X}", body.len()).as_bytes());
    out.extend_from_slice(body);
    out
}

/// Parses a 4-byte hex length header. The server replies in lowercase;
/// we emit uppercase; both parse.
pub fn parse_hex_len(header: &[u8; 4]) -> Result<usize> {
    let text = std::str::from_utf8(header)
        .map_err(|_| AdbError::MalformedFrame(hex::encode(header)))?;
    usize::from_str_radix(text, 16).map_err(|_| AdbError::MalformedFrame(hex::encode(header)))
}
