//! Shell and exec services. `shell:` merges stdout and stderr into one
//! byte stream; `shell,v2:` (feature `shell_v2`) multiplexes them and
//! carries the exit code; `exec:` is binary-clean; `abb_exec:` talks to
//! the App Binary Bridge with a NUL-separated argv.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::error::Result;
use crate::features::{Feature, FeatureSet};
use crate::request::{ComplexRequest, ConnectionTarget, Request, ValidationResponse};
use crate::transport::{Stream, Transport};

fn read_to_end<S: Stream>(transport: &mut Transport<S>) -> Result<Vec<u8>> {
    let mut buf = [0u8; 4096];
    let mut out = Vec::new();
    loop {
        let n = transport.read_available(&mut buf)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
    }
}

/// `shell:<cmd>` — run a command, capture the combined output.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    command: String,
    target: ConnectionTarget,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>, target: ConnectionTarget) -> Self {
        Self { command: command.into(), target }
    }
}

impl Request for ShellCommand {
    fn validate(&self) -> ValidationResponse {
        if self.command.is_empty() {
            ValidationResponse::invalid("empty shell command")
        } else {
            ValidationResponse::valid()
        }
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        format!("shell:{}", self.command).into_bytes()
    }
}

impl ComplexRequest for ShellCommand {
    type Output = String;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<String> {
        Ok(String::from_utf8_lossy(&read_to_end(transport)?).into_owned())
    }
}

/// `exec:<cmd>` — like shell but with a raw, binary-clean stream.
#[derive(Debug, Clone)]
pub struct ExecCommand {
    command: String,
    target: ConnectionTarget,
}

impl ExecCommand {
    pub fn new(command: impl Into<String>, target: ConnectionTarget) -> Self {
        Self { command: command.into(), target }
    }
}

impl Request for ExecCommand {
    fn validate(&self) -> ValidationResponse {
        if self.command.is_empty() {
            ValidationResponse::invalid("empty exec command")
        } else {
            ValidationResponse::valid()
        }
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        format!("exec:{}", self.command).into_bytes()
    }
}

impl ComplexRequest for ExecCommand {
    type Output = Vec<u8>;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<Vec<u8>> {
        read_to_end(transport)
    }
}

/// `abb_exec:<arg0>\0<arg1>\0…` — exec through the App Binary Bridge.
#[derive(Debug, Clone)]
pub struct AbbExecCommand {
    argv: Vec<String>,
    features: FeatureSet,
    target: ConnectionTarget,
}

impl AbbExecCommand {
    pub fn new<I, T>(argv: I, features: FeatureSet, target: ConnectionTarget) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            features,
            target,
        }
    }
}

impl Request for AbbExecCommand {
    fn validate(&self) -> ValidationResponse {
        if self.argv.is_empty() {
            return ValidationResponse::invalid("empty abb argv");
        }
        match self.features.first_missing(self.required_features()) {
            Some(missing) => ValidationResponse::invalid(format!(
                "device does not advertise the {} feature",
                missing.token()
            )),
            None => ValidationResponse::valid(),
        }
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn required_features(&self) -> &'static [Feature] {
        &[Feature::AbbExec]
    }

    fn body(&self) -> Vec<u8> {
        let mut out = b"abb_exec:".to_vec();
        out.extend_from_slice(self.argv.join("\0").as_bytes());
        out
    }
}

impl ComplexRequest for AbbExecCommand {
    type Output = Vec<u8>;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<Vec<u8>> {
        read_to_end(transport)
    }
}

/// Decoded `shell,v2:` result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellV2Output {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: u8,
}

const V2_ID_STDOUT: u8 = 1;
const V2_ID_STDERR: u8 = 2;
const V2_ID_EXIT: u8 = 3;

/// `shell,v2:<cmd>` — protocol-2 shell with separated streams and an exit
/// code, gated on the `shell_v2` feature.
#[derive(Debug, Clone)]
pub struct ShellV2Command {
    command: String,
    features: FeatureSet,
    target: ConnectionTarget,
}

impl ShellV2Command {
    pub fn new(
        command: impl Into<String>,
        features: FeatureSet,
        target: ConnectionTarget,
    ) -> Self {
        Self { command: command.into(), features, target }
    }
}

impl Request for ShellV2Command {
    fn validate(&self) -> ValidationResponse {
        if self.command.is_empty() {
            return ValidationResponse::invalid("empty shell command");
        }
        match self.features.first_missing(self.required_features()) {
            Some(missing) => ValidationResponse::invalid(format!(
                "device does not advertise the {} feature",
                missing.token()
            )),
            None => ValidationResponse::valid(),
        }
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn required_features(&self) -> &'static [Feature] {
        &[Feature::ShellV2]
    }

    fn body(&self) -> Vec<u8> {
        format!("shell,v2:{}", self.command).into_bytes()
    }
}

impl ComplexRequest for ShellV2Command {
    type Output = ShellV2Output;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<ShellV2Output> {
        let mut output = ShellV2Output::default();
        loop {
            // 5-byte packet header: stream id + LE u32 payload length.
            let mut header = [0u8; 5];
            match transport.read_exact(&mut header) {
                Ok(()) => {}
                Err(crate::error::AdbError::ShortRead { got: 0, .. }) => break,
                Err(err) => return Err(err),
            }
            let len = LittleEndian::read_u32(&header[1..5]) as usize;
            let mut payload = vec![0u8; len];
            transport.read_exact(&mut payload)?;
            match header[0] {
                V2_ID_STDOUT => output.stdout.extend_from_slice(&payload),
                V2_ID_STDERR => output.stderr.extend_from_slice(&payload),
                V2_ID_EXIT => {
                    output.exit_code = payload.first().copied().unwrap_or(0);
                    break;
                }
                other => debug!("ignoring shell v2 packet id {}", other),
            }
        }
        Ok(output)
    }
}

/// `reboot:` — device-scoped reboot; the stream just closes.
#[derive(Debug, Clone)]
pub struct Reboot {
    target: ConnectionTarget,
}

impl Reboot {
    pub fn new(target: ConnectionTarget) -> Self {
        Self { target }
    }
}

impl Request for Reboot {
    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        b"reboot:".to_vec()
    }
}

impl ComplexRequest for Reboot {
    type Output = ();

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<()> {
        let _ = read_to_end(transport)?;
        Ok(())
    }
}
