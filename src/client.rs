// Copyright (C) 2025 HasX
// Licensed under the GNU AGPL v3.0. See LICENSE file for details.
// Website: https://hasx.dev

//! The request runner. One TCP connection per request: the server closes
//! the control socket after FAIL and after most host queries, so retrying
//! or batching over one socket is not an option at this layer.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream};
use std::path::Path;
use std::time::Duration;

use log::trace;

use crate::error::{AdbError, Result};
use crate::features::FeatureSet;
use crate::host::{Device, HostFeatures, HostVersion, KillServer, ListDevices};
use crate::install::{InstallPackage, InstallSession};
use crate::request::{ComplexRequest, ConnectionTarget, Request, StreamingRequest};
use crate::shell::{AbbExecCommand, ExecCommand, Reboot, ShellCommand, ShellV2Command, ShellV2Output};
use crate::sync::pull::{PullFile, PullSession};
use crate::sync::push::{PushFile, PushSession};
use crate::sync::{FileEntry, StatFile};
use crate::transport::{expect_okay, CancelToken, Transport};
use crate::wire;

/// Where a stock adb server listens.
pub const DEFAULT_SERVER_ADDR: SocketAddrV4 =
    SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 5037);

/// Entry point: runs typed requests against one adb server address.
///
/// The client is stateless between requests; feature snapshots obtained
/// from [`features`](AdbClient::features) are per-device and should be
/// refreshed when the device changes.
#[derive(Debug, Clone)]
pub struct AdbClient {
    addr: SocketAddr,
    timeout: Option<Duration>,
}

impl Default for AdbClient {
    fn default() -> Self {
        Self::new(SocketAddr::V4(DEFAULT_SERVER_ADDR))
    }
}

impl AdbClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr, timeout: None }
    }

    /// Applies a caller deadline to every socket this client opens. The
    /// library itself never sets one.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn open_transport(&self) -> Result<Transport<TcpStream>> {
        let mut transport = Transport::connect(self.addr)?;
        transport.set_timeouts(self.timeout)?;
        Ok(transport)
    }

    /// Validate, dial, select the transport, submit the framed payload and
    /// run the arbiter. On return the socket is positioned at the
    /// request's response body.
    fn prepare<R: Request>(&self, request: &R) -> Result<Transport<TcpStream>> {
        let validation = request.validate();
        if !validation.ok {
            return Err(AdbError::RequestValidation(
                validation.message.unwrap_or_else(|| "invalid request".to_string()),
            ));
        }
        let mut transport = self.open_transport()?;
        if let Some(target) = request.target() {
            trace!("selecting transport: {}", target.service());
            transport.write_all(&wire::frame(target.service().as_bytes()))?;
            expect_okay(&mut transport)?;
        }
        transport.write_all(&request.serialize())?;
        expect_okay(&mut transport)?;
        Ok(transport)
    }

    /// Runs a single-shot request to completion.
    pub fn execute<R: ComplexRequest>(&self, mut request: R) -> Result<R::Output> {
        let mut transport = self.prepare(&request)?;
        let output = request.read_result(&mut transport)?;
        transport.close();
        Ok(output)
    }

    /// Starts a streaming request and hands back its session. The session
    /// owns the socket until it finishes.
    pub fn open<R: StreamingRequest>(&self, request: R) -> Result<R::Session<TcpStream>> {
        let transport = self.prepare(&request)?;
        request.open(transport)
    }

    /// Like [`open`](AdbClient::open), also returning a token that can
    /// cancel the transfer from another thread. Cancellation closes the
    /// socket; a cancelled pull leaves its partial local file in place.
    pub fn open_with_cancel<R: StreamingRequest>(
        &self,
        request: R,
    ) -> Result<(R::Session<TcpStream>, CancelToken)> {
        let transport = self.prepare(&request)?;
        let token = transport.cancel_token()?;
        Ok((request.open(transport)?, token))
    }

    // Typed conveniences over the raw execute/open surface.

    pub fn server_version(&self) -> Result<u32> {
        self.execute(HostVersion)
    }

    pub fn devices(&self) -> Result<Vec<Device>> {
        self.execute(ListDevices::new())
    }

    pub fn devices_long(&self) -> Result<Vec<Device>> {
        self.execute(ListDevices::long())
    }

    pub fn features(&self, serial: &str) -> Result<FeatureSet> {
        self.execute(HostFeatures::new(serial))
    }

    pub fn kill_server(&self) -> Result<()> {
        self.execute(KillServer)
    }

    pub fn shell(&self, target: ConnectionTarget, command: &str) -> Result<String> {
        self.execute(ShellCommand::new(command, target))
    }

    pub fn shell_v2(
        &self,
        target: ConnectionTarget,
        features: FeatureSet,
        command: &str,
    ) -> Result<ShellV2Output> {
        self.execute(ShellV2Command::new(command, features, target))
    }

    pub fn exec(&self, target: ConnectionTarget, command: &str) -> Result<Vec<u8>> {
        self.execute(ExecCommand::new(command, target))
    }

    pub fn abb_exec<I, T>(
        &self,
        target: ConnectionTarget,
        features: FeatureSet,
        argv: I,
    ) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.execute(AbbExecCommand::new(argv, features, target))
    }

    pub fn reboot(&self, target: ConnectionTarget) -> Result<()> {
        self.execute(Reboot::new(target))
    }

    pub fn stat(&self, target: ConnectionTarget, remote_path: &str) -> Result<FileEntry> {
        self.execute(StatFile::new(remote_path, target))
    }

    pub fn pull(
        &self,
        target: ConnectionTarget,
        remote_path: &str,
        local_path: impl AsRef<Path>,
    ) -> Result<PullSession<TcpStream, std::fs::File>> {
        self.open(PullFile::new(remote_path, local_path.as_ref(), target))
    }

    pub fn push(
        &self,
        target: ConnectionTarget,
        local_path: impl AsRef<Path>,
        remote_path: &str,
    ) -> Result<PushSession<TcpStream, std::fs::File>> {
        self.open(PushFile::new(local_path.as_ref(), remote_path, target))
    }

    pub fn install(
        &self,
        target: ConnectionTarget,
        package_path: impl AsRef<Path>,
        features: FeatureSet,
    ) -> Result<InstallSession<TcpStream>> {
        self.open(InstallPackage::new(package_path.as_ref(), features, target))
    }
}
