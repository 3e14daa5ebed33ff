use thiserror::Error;

/// Every way a request can fail, from validation through wire-level
/// corruption. Callers that only need a message can use `Display`; the
/// variant is the machine-readable kind.
#[derive(Debug, Error)]
pub enum AdbError {
    /// The request refused its own parameters before any I/O happened.
    #[error("request validation failed: {0}")]
    RequestValidation(String),

    /// The server answered FAIL on the control channel. The server closes
    /// the connection after this; retrying needs a fresh socket.
    #[error("request rejected by server: {0}")]
    RequestRejected(String),

    /// The 4-byte status preamble was neither OKAY nor FAIL.
    #[error("unexpected transport response (hex): {0}")]
    UnexpectedTransportResponse(String),

    /// A length header did not parse as 4 hex digits.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A 4-byte tag outside the known set.
    #[error("unexpected tag (hex): {0}")]
    UnexpectedTag(String),

    /// The peer violated the sync sub-protocol (wrong response tag,
    /// oversized data chunk). The socket is unusable afterwards.
    #[error("unsupported sync protocol: {0}")]
    UnsupportedSyncProtocol(String),

    /// Sync-level FAIL while pulling, with the device-supplied message.
    #[error("pull of {path} failed: {message}")]
    PullFailed { path: String, message: String },

    /// Sync-level FAIL while pushing, with the device-supplied message.
    #[error("push failed: {0}")]
    PushFailed(String),

    /// The peer closed mid-read.
    #[error("short read: wanted {wanted} bytes, got {got}")]
    ShortRead { wanted: usize, got: usize },

    #[error("write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// The operation was cancelled via its [`CancelToken`](crate::transport::CancelToken).
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdbError>;
