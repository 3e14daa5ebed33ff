//! Client library for the adb server wire protocol.
//!
//! Talks to a locally running adb server (default `127.0.0.1:5037`) over
//! TCP and exposes its services as typed requests: device listings, shell
//! and exec output, feature probes, sync file transfer (pull/push) and
//! package installation over the feature-negotiated transports.
//!
//! ```no_run
//! use adblink::{AdbClient, ConnectionTarget};
//!
//! # fn main() -> adblink::Result<()> {
//! let client = AdbClient::default();
//! println!("server version {}", client.server_version()?);
//! for device in client.devices_long()? {
//!     println!("{} ({:?})", device.serial, device.state);
//! }
//!
//! let features = client.features("emulator-5554")?;
//! let session = client.install(
//!     ConnectionTarget::Serial("emulator-5554".into()),
//!     "app.apk",
//!     features,
//! )?;
//! let installed = adblink::request::drain(session)?;
//! # let _ = installed;
//! # Ok(())
//! # }
//! ```
//!
//! Transfers are lazy: [`AdbClient::pull`], [`AdbClient::push`] and
//! [`AdbClient::install`] return iterator sessions yielding
//! [`TransferEvent::Progress`] values (monotone in `[0.0, 1.0]`, terminal
//! `1.0`) followed by [`TransferEvent::Done`]. Use
//! [`request::drain`] when progress is not interesting.

pub mod client;
pub mod error;
pub mod features;
pub mod host;
pub mod install;
pub mod request;
pub mod shell;
pub mod sync;
pub mod transport;
pub mod wire;

#[cfg(test)]
pub(crate) mod test_stream;

pub use client::{AdbClient, DEFAULT_SERVER_ADDR};
pub use error::{AdbError, Result};
pub use features::{Feature, FeatureSet};
pub use host::{Device, DeviceState};
pub use request::{ConnectionTarget, TransferEvent, ValidationResponse};
pub use sync::FileEntry;
