//! The request contract. A request knows how to validate its own
//! parameters, which device (if any) must be selected first, the control
//! payload it serializes to, and how to decode the server's answer.
//!
//! Two decoder shapes exist: [`ComplexRequest`] for single-shot answers and
//! [`StreamingRequest`] for long-running transfers that surface a lazy
//! sequence of progress values terminated by a final result.

use crate::error::Result;
use crate::features::Feature;
use crate::transport::{Stream, Transport};
use crate::wire;

/// Outcome of [`Request::validate`]. Always produced synchronously, before
/// any network work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResponse {
    pub ok: bool,
    pub message: Option<String>,
}

impl ValidationResponse {
    pub fn valid() -> Self {
        Self { ok: true, message: None }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self { ok: false, message: Some(message.into()) }
    }
}

/// Which transport the server should bind the connection to before the
/// request proper runs. Host-side requests have no target and encode the
/// serial (if any) inside their own payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// Any attached device; errors if there are several.
    Any,
    /// A specific device by serial number.
    Serial(String),
    /// The single USB-attached device.
    UsbDevice,
    /// The single local emulator.
    Emulator,
}

impl ConnectionTarget {
    /// The `host:transport…` prefix command selecting this target.
    pub fn service(&self) -> String {
        match self {
            ConnectionTarget::Any => "host:transport-any".to_string(),
            ConnectionTarget::Serial(serial) => format!("host:transport:{}", serial),
            ConnectionTarget::UsbDevice => "host:transport-usb".to_string(),
            ConnectionTarget::Emulator => "host:transport-local".to_string(),
        }
    }
}

/// One element of a streaming request's lazy result sequence. `Progress`
/// values are monotonically non-decreasing in `[0.0, 1.0]`; a terminal
/// `Progress(1.0)` precedes `Done`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent<T> {
    Progress(f64),
    Done(T),
}

pub trait Request {
    /// Checks the request's own parameters. No I/O. A failed validation
    /// stops the runner before it touches the socket.
    fn validate(&self) -> ValidationResponse {
        ValidationResponse::valid()
    }

    /// Transport to select before serializing, if device-scoped.
    fn target(&self) -> Option<ConnectionTarget> {
        None
    }

    /// Features the device must advertise for this request to work.
    /// Validation consults the snapshot the caller handed the request.
    fn required_features(&self) -> &'static [Feature] {
        &[]
    }

    /// The unframed control-channel payload.
    fn body(&self) -> Vec<u8>;

    /// The framed payload. Deterministic; may be called repeatedly.
    fn serialize(&self) -> Vec<u8> {
        wire::frame(&self.body())
    }
}

/// A request whose whole answer is decoded in one go after OKAY.
pub trait ComplexRequest: Request {
    type Output;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<Self::Output>;
}

/// A request that takes over the socket after OKAY and yields progress
/// until a terminal value. The session owns the transport: nothing else
/// may share the socket until the transfer ends, and a mid-transfer FAIL
/// poisons it.
pub trait StreamingRequest: Request {
    type Output;
    type Session<S: Stream>: Iterator<Item = Result<TransferEvent<Self::Output>>>;

    fn open<S: Stream>(self, transport: Transport<S>) -> Result<Self::Session<S>>;
}

/// Runs a streaming session to completion, discarding progress, and
/// returns the terminal value.
pub fn drain<T>(session: impl Iterator<Item = Result<TransferEvent<T>>>) -> Result<T> {
    let mut result = None;
    for event in session {
        if let TransferEvent::Done(value) = event? {
            result = Some(value);
        }
    }
    result.ok_or_else(|| {
        crate::error::AdbError::UnexpectedTransportResponse(
            "transfer ended without a terminal value".to_string(),
        )
    })
}
