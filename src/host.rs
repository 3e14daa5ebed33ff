// Copyright (C) 2025 HasX
// Licensed under the GNU AGPL v3.0. See LICENSE file for details.
// Website: https://hasx.dev

//! Host-side services: questions answered by the adb server itself rather
//! than a device. These requests carry no transport target; a serial, when
//! needed, rides inside the payload (`host-serial:…`).

use serde::{Deserialize, Serialize};

use crate::error::{AdbError, Result};
use crate::features::FeatureSet;
use crate::request::{ComplexRequest, Request, ValidationResponse};
use crate::transport::{read_framed, Stream, Transport};

/// Connection state of a listed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceState {
    Device,
    Offline,
    Unauthorized,
    Bootloader,
    Recovery,
    Sideload,
    Rescue,
    NoPermissions,
    Unknown(String),
}

impl DeviceState {
    fn from_token(token: &str) -> Self {
        match token {
            "device" => DeviceState::Device,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            "bootloader" => DeviceState::Bootloader,
            "recovery" => DeviceState::Recovery,
            "sideload" => DeviceState::Sideload,
            "rescue" => DeviceState::Rescue,
            "no" => DeviceState::NoPermissions, // "no permissions (…)"
            other => DeviceState::Unknown(other.to_string()),
        }
    }
}

/// One row of `host:devices` / `host:devices-l`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub serial: String,
    pub state: DeviceState,
    pub product: Option<String>,
    pub model: Option<String>,
    pub device: Option<String>,
    pub transport_id: Option<u32>,
}

impl Device {
    /// Parses one listing row. The short form is `serial\tstate`; the long
    /// form appends `key:value` columns.
    fn parse(line: &str) -> Option<Self> {
        let mut columns = line.split_whitespace();
        let serial = columns.next()?.to_string();
        let state = DeviceState::from_token(columns.next()?);
        let mut device = Device {
            serial,
            state,
            product: None,
            model: None,
            device: None,
            transport_id: None,
        };
        for column in columns {
            match column.split_once(':') {
                Some(("product", v)) => device.product = Some(v.to_string()),
                Some(("model", v)) => device.model = Some(v.to_string()),
                Some(("device", v)) => device.device = Some(v.to_string()),
                Some(("transport_id", v)) => device.transport_id = v.parse().ok(),
                _ => {}
            }
        }
        Some(device)
    }
}

/// `host:version` — the server's internal protocol version.
#[derive(Debug, Clone, Default)]
pub struct HostVersion;

impl Request for HostVersion {
    fn body(&self) -> Vec<u8> {
        b"host:version".to_vec()
    }
}

impl ComplexRequest for HostVersion {
    type Output = u32;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<u32> {
        let body = read_framed(transport)?;
        let text = std::str::from_utf8(&body)
            .map_err(|_| AdbError::MalformedFrame(hex::encode(&body)))?;
        u32::from_str_radix(text, 16).map_err(|_| AdbError::MalformedFrame(text.to_string()))
    }
}

/// `host:devices` / `host:devices-l` — the attached-device listing.
#[derive(Debug, Clone)]
pub struct ListDevices {
    long: bool,
}

impl ListDevices {
    pub fn new() -> Self {
        Self { long: false }
    }

    /// The `-l` form with product/model/device/transport columns.
    pub fn long() -> Self {
        Self { long: true }
    }
}

impl Default for ListDevices {
    fn default() -> Self {
        Self::new()
    }
}

impl Request for ListDevices {
    fn body(&self) -> Vec<u8> {
        if self.long {
            b"host:devices-l".to_vec()
        } else {
            b"host:devices".to_vec()
        }
    }
}

impl ComplexRequest for ListDevices {
    type Output = Vec<Device>;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<Vec<Device>> {
        let body = read_framed(transport)?;
        let text = String::from_utf8_lossy(&body);
        Ok(text.lines().filter_map(Device::parse).collect())
    }
}

/// `host-serial:<serial>:features` — the device's advertised protocol
/// extensions, as a snapshot for request gating.
#[derive(Debug, Clone)]
pub struct HostFeatures {
    serial: String,
}

impl HostFeatures {
    pub fn new(serial: impl Into<String>) -> Self {
        Self { serial: serial.into() }
    }
}

impl Request for HostFeatures {
    fn validate(&self) -> ValidationResponse {
        if self.serial.is_empty() {
            ValidationResponse::invalid("empty device serial")
        } else {
            ValidationResponse::valid()
        }
    }

    fn body(&self) -> Vec<u8> {
        format!("host-serial:{}:features", self.serial).into_bytes()
    }
}

impl ComplexRequest for HostFeatures {
    type Output = FeatureSet;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<FeatureSet> {
        let body = read_framed(transport)?;
        Ok(FeatureSet::parse(&String::from_utf8_lossy(&body)))
    }
}

/// `host:kill` — asks the server to exit. It acknowledges and closes.
#[derive(Debug, Clone, Default)]
pub struct KillServer;

impl Request for KillServer {
    fn body(&self) -> Vec<u8> {
        b"host:kill".to_vec()
    }
}

impl ComplexRequest for KillServer {
    type Output = ();

    fn read_result<S: Stream>(&mut self, _transport: &mut Transport<S>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Feature;
    use crate::test_stream::ScriptedStream;

    #[test]
    fn version_decodes_hex_body() {
        assert_eq!(HostVersion.serialize(), b"000Chost:version");
        let mut t = Transport::new(ScriptedStream::replying(b"0004001f"));
        assert_eq!(HostVersion.read_result(&mut t).unwrap(), 0x001f);
    }

    #[test]
    fn version_rejects_non_hex_body() {
        let mut t = Transport::new(ScriptedStream::replying(b"0004zzzz"));
        assert!(matches!(
            HostVersion.read_result(&mut t).unwrap_err(),
            AdbError::MalformedFrame(_)
        ));
    }

    #[test]
    fn parses_short_listing() {
        let body = b"emulator-5554\tdevice\n0123456789ABCDEF\tunauthorized\n";
        let framed = crate::wire::frame(body);
        let mut t = Transport::new(ScriptedStream::replying(&framed));
        let devices = ListDevices::new().read_result(&mut t).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].serial, "emulator-5554");
        assert_eq!(devices[0].state, DeviceState::Device);
        assert_eq!(devices[1].state, DeviceState::Unauthorized);
        assert_eq!(devices[1].product, None);
    }

    #[test]
    fn parses_long_listing_columns() {
        let body = b"emulator-5554 device product:sdk_gphone64 model:Pixel_6 device:emu64a transport_id:1\n";
        let framed = crate::wire::frame(body);
        let mut t = Transport::new(ScriptedStream::replying(&framed));
        let devices = ListDevices::long().read_result(&mut t).unwrap();
        assert_eq!(devices.len(), 1);
        let d = &devices[0];
        assert_eq!(d.product.as_deref(), Some("sdk_gphone64"));
        assert_eq!(d.model.as_deref(), Some("Pixel_6"));
        assert_eq!(d.device.as_deref(), Some("emu64a"));
        assert_eq!(d.transport_id, Some(1));
    }

    #[test]
    fn device_rows_serialize() {
        let body = b"emulator-5554 device transport_id:2\n";
        let framed = crate::wire::frame(body);
        let mut t = Transport::new(ScriptedStream::replying(&framed));
        let devices = ListDevices::long().read_result(&mut t).unwrap();
        let json = serde_json::to_string(&devices).unwrap();
        let back: Vec<Device> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, devices);
    }

    #[test]
    fn features_request_shape() {
        let req = HostFeatures::new("emulator-5554");
        assert_eq!(req.body(), b"host-serial:emulator-5554:features");
        assert!(req.target().is_none());
        assert!(!HostFeatures::new("").validate().ok);
    }

    #[test]
    fn features_reply_parses_into_snapshot() {
        let framed = crate::wire::frame(b"cmd,shell_v2,abb_exec,apex");
        let mut t = Transport::new(ScriptedStream::replying(&framed));
        let set = HostFeatures::new("emulator-5554").read_result(&mut t).unwrap();
        for f in [Feature::Cmd, Feature::ShellV2, Feature::AbbExec, Feature::Apex] {
            assert!(set.supports(f));
        }
        assert!(!set.supports(Feature::StatV2));
    }
}
