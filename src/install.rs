// Copyright (C) 2025 HasX
// Licensed under the GNU AGPL v3.0. See LICENSE file for details.
// Website: https://hasx.dev

//! Package installation over the feature-negotiated transports.
//!
//! Newer devices stream packages through `abb_exec:` (NUL-separated argv)
//! or `exec:cmd package` (space-joined); ancient ones only have `exec:pm`,
//! which the multi-session flow keeps as a fallback. In every case the
//! device reads the package bytes straight off the socket after OKAY, the
//! client half-closes to mark EOF, and the device answers with a textual
//! verdict.
//!
//! The verdict parse is deliberately shallow: a reply is a success iff it
//! starts with `Success` after trimming. `Success\nWARNING:…` therefore
//! counts as success, and a success line preceded by other output does
//! not. Callers that need the raw verdict use the multi-session flow,
//! whose failures carry the device's full reply.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::error::{AdbError, Result};
use crate::features::{Feature, FeatureSet};
use crate::request::{
    ComplexRequest, ConnectionTarget, Request, StreamingRequest, TransferEvent,
    ValidationResponse,
};
use crate::sync::MAX_FILE_PACKET_LENGTH;
use crate::transport::{Stream, Transport};

/// Which exec surface carries the install, picked per device features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstallTransport {
    AbbExec,
    Cmd,
    Pm,
}

/// First match wins: abb_exec, then cmd, then (only where the legacy
/// fallback is allowed) pm.
fn select_transport(features: &FeatureSet, allow_legacy: bool) -> Option<InstallTransport> {
    if features.supports(Feature::AbbExec) {
        Some(InstallTransport::AbbExec)
    } else if features.supports(Feature::Cmd) {
        Some(InstallTransport::Cmd)
    } else if allow_legacy {
        Some(InstallTransport::Pm)
    } else {
        None
    }
}

/// Renders `argv` (everything after the package-manager word) for the
/// chosen transport.
fn render_payload(transport: InstallTransport, argv: &[String]) -> Vec<u8> {
    match transport {
        InstallTransport::AbbExec => {
            let mut full = Vec::with_capacity(argv.len() + 1);
            full.push("package".to_string());
            full.extend_from_slice(argv);
            let mut out = b"abb_exec:".to_vec();
            out.extend_from_slice(full.join("\0").as_bytes());
            out
        }
        InstallTransport::Cmd => {
            let mut out = b"exec:cmd package ".to_vec();
            out.extend_from_slice(argv.join(" ").as_bytes());
            out
        }
        InstallTransport::Pm => {
            let mut out = b"exec:pm ".to_vec();
            out.extend_from_slice(argv.join(" ").as_bytes());
            out
        }
    }
}

/// The space-joined transports take the caller's extra arguments as one
/// single-quoted word; embedded quotes are backslash-escaped.
fn quote_extra_args(extra_args: &[String]) -> String {
    format!("'{}'", extra_args.join(" ").replace('\'', "\\'"))
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn validate_package_file(path: &Path, features: &FeatureSet) -> ValidationResponse {
    if !path.is_file() {
        return ValidationResponse::invalid(format!(
            "{} does not exist or is not a regular file",
            path.display()
        ));
    }
    match extension_of(path).as_deref() {
        Some("apk") => ValidationResponse::valid(),
        Some("apex") => {
            if features.supports(Feature::Apex) {
                ValidationResponse::valid()
            } else {
                ValidationResponse::invalid("device does not support APEX packages")
            }
        }
        _ => ValidationResponse::invalid(format!(
            "{} is neither an .apk nor an .apex",
            path.display()
        )),
    }
}

fn is_success_reply(reply: &str) -> bool {
    reply.trim().starts_with("Success")
}

/// Single-shot install of one package. Requires `cmd` or `abb_exec`; the
/// legacy `pm` surface cannot stream a lone package reliably, so its
/// absence is a validation failure rather than a fallback.
#[derive(Debug, Clone)]
pub struct InstallPackage {
    package_path: PathBuf,
    size: u64,
    reinstall: bool,
    extra_args: Vec<String>,
    features: FeatureSet,
    target: ConnectionTarget,
}

impl InstallPackage {
    pub fn new(
        package_path: impl Into<PathBuf>,
        features: FeatureSet,
        target: ConnectionTarget,
    ) -> Self {
        let package_path = package_path.into();
        let size = std::fs::metadata(&package_path).map(|m| m.len()).unwrap_or(0);
        Self {
            package_path,
            size,
            reinstall: false,
            extra_args: Vec::new(),
            features,
            target,
        }
    }

    /// Passes `-r` (replace an existing install).
    pub fn reinstall(mut self) -> Self {
        self.reinstall = true;
        self
    }

    pub fn with_extra_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    fn is_apex(&self) -> bool {
        extension_of(&self.package_path).as_deref() == Some("apex")
    }

    fn argv(&self, transport: InstallTransport) -> Vec<String> {
        let mut argv = vec!["install".to_string()];
        if !self.extra_args.is_empty() {
            match transport {
                InstallTransport::AbbExec => argv.extend(self.extra_args.iter().cloned()),
                _ => argv.push(quote_extra_args(&self.extra_args)),
            }
        }
        if self.reinstall {
            argv.push("-r".to_string());
        }
        argv.push("-S".to_string());
        argv.push(self.size.to_string());
        if self.is_apex() {
            argv.push("--apex".to_string());
        }
        argv
    }
}

impl Request for InstallPackage {
    fn validate(&self) -> ValidationResponse {
        let file = validate_package_file(&self.package_path, &self.features);
        if !file.ok {
            return file;
        }
        if select_transport(&self.features, false).is_none() {
            return ValidationResponse::invalid(
                "device supports neither cmd nor abb_exec; use an install session",
            );
        }
        ValidationResponse::valid()
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn required_features(&self) -> &'static [Feature] {
        // One of cmd/abb_exec, checked in validate(); apex only for .apex.
        &[]
    }

    fn body(&self) -> Vec<u8> {
        let transport = select_transport(&self.features, false).unwrap_or(InstallTransport::Cmd);
        debug!("installing {} via {:?}", self.package_path.display(), transport);
        render_payload(transport, &self.argv(transport))
    }
}

impl StreamingRequest for InstallPackage {
    type Output = bool;
    type Session<S: Stream> = InstallSession<S>;

    fn open<S: Stream>(self, transport: Transport<S>) -> Result<InstallSession<S>> {
        let source = File::open(&self.package_path)?;
        Ok(InstallSession::new(transport, source, self.size, false))
    }
}

/// A multi-package staging transaction: `install-create`, any number of
/// `install-write`s, then `install-commit` (or `install-abandon`).
#[derive(Debug, Clone)]
pub struct CreateInstallSession {
    extra_args: Vec<String>,
    features: FeatureSet,
    target: ConnectionTarget,
}

impl CreateInstallSession {
    pub fn new(features: FeatureSet, target: ConnectionTarget) -> Self {
        Self { extra_args: Vec::new(), features, target }
    }

    pub fn with_extra_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Request for CreateInstallSession {
    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        let transport =
            select_transport(&self.features, true).unwrap_or(InstallTransport::Pm);
        let mut argv = vec!["install-create".to_string()];
        if !self.extra_args.is_empty() {
            match transport {
                InstallTransport::AbbExec => argv.extend(self.extra_args.iter().cloned()),
                _ => argv.push(quote_extra_args(&self.extra_args)),
            }
        }
        render_payload(transport, &argv)
    }
}

impl ComplexRequest for CreateInstallSession {
    type Output = String;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<String> {
        let reply = read_reply(transport)?;
        // "Success: created install session [1234567]"
        let id = reply
            .find('[')
            .and_then(|start| reply[start + 1..].find(']').map(|end| (start, end)))
            .map(|(start, end)| reply[start + 1..start + 1 + end].to_string());
        match id {
            Some(id) if is_success_reply(&reply) && !id.is_empty() => Ok(id),
            _ => Err(AdbError::RequestRejected(reply)),
        }
    }
}

/// Streams one package into an existing install session
/// (`install-write … <session-id> <filename> -`). A non-Success verdict is
/// an error carrying the device's reply.
#[derive(Debug, Clone)]
pub struct InstallWrite {
    package_path: PathBuf,
    size: u64,
    session_id: String,
    features: FeatureSet,
    target: ConnectionTarget,
}

impl InstallWrite {
    pub fn new(
        package_path: impl Into<PathBuf>,
        session_id: impl Into<String>,
        features: FeatureSet,
        target: ConnectionTarget,
    ) -> Self {
        let package_path = package_path.into();
        let size = std::fs::metadata(&package_path).map(|m| m.len()).unwrap_or(0);
        Self {
            package_path,
            size,
            session_id: session_id.into(),
            features,
            target,
        }
    }

    fn file_name(&self) -> String {
        self.package_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Request for InstallWrite {
    fn validate(&self) -> ValidationResponse {
        if self.session_id.is_empty() {
            return ValidationResponse::invalid("empty install session id");
        }
        validate_package_file(&self.package_path, &self.features)
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        let transport =
            select_transport(&self.features, true).unwrap_or(InstallTransport::Pm);
        let argv = vec![
            "install-write".to_string(),
            "-S".to_string(),
            self.size.to_string(),
            self.session_id.clone(),
            self.file_name(),
            "-".to_string(),
        ];
        render_payload(transport, &argv)
    }
}

impl StreamingRequest for InstallWrite {
    type Output = ();
    type Session<S: Stream> = InstallWriteSession<S>;

    fn open<S: Stream>(self, transport: Transport<S>) -> Result<InstallWriteSession<S>> {
        let source = File::open(&self.package_path)?;
        Ok(InstallWriteSession {
            inner: InstallSession::new(transport, source, self.size, true),
        })
    }
}

/// Finalizes an install session.
#[derive(Debug, Clone)]
pub struct CommitInstallSession {
    session_id: String,
    features: FeatureSet,
    target: ConnectionTarget,
}

impl CommitInstallSession {
    pub fn new(
        session_id: impl Into<String>,
        features: FeatureSet,
        target: ConnectionTarget,
    ) -> Self {
        Self { session_id: session_id.into(), features, target }
    }
}

impl Request for CommitInstallSession {
    fn validate(&self) -> ValidationResponse {
        if self.session_id.is_empty() {
            ValidationResponse::invalid("empty install session id")
        } else {
            ValidationResponse::valid()
        }
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        let transport =
            select_transport(&self.features, true).unwrap_or(InstallTransport::Pm);
        let argv = vec!["install-commit".to_string(), self.session_id.clone()];
        render_payload(transport, &argv)
    }
}

impl ComplexRequest for CommitInstallSession {
    type Output = bool;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<bool> {
        Ok(is_success_reply(&read_reply(transport)?))
    }
}

/// Discards an install session and its staged packages.
#[derive(Debug, Clone)]
pub struct AbandonInstallSession {
    session_id: String,
    features: FeatureSet,
    target: ConnectionTarget,
}

impl AbandonInstallSession {
    pub fn new(
        session_id: impl Into<String>,
        features: FeatureSet,
        target: ConnectionTarget,
    ) -> Self {
        Self { session_id: session_id.into(), features, target }
    }
}

impl Request for AbandonInstallSession {
    fn validate(&self) -> ValidationResponse {
        if self.session_id.is_empty() {
            ValidationResponse::invalid("empty install session id")
        } else {
            ValidationResponse::valid()
        }
    }

    fn target(&self) -> Option<ConnectionTarget> {
        Some(self.target.clone())
    }

    fn body(&self) -> Vec<u8> {
        let transport =
            select_transport(&self.features, true).unwrap_or(InstallTransport::Pm);
        let argv = vec!["install-abandon".to_string(), self.session_id.clone()];
        render_payload(transport, &argv)
    }
}

impl ComplexRequest for AbandonInstallSession {
    type Output = bool;

    fn read_result<S: Stream>(&mut self, transport: &mut Transport<S>) -> Result<bool> {
        Ok(is_success_reply(&read_reply(transport)?))
    }
}

/// Accumulates the read side to EOF as lossy UTF-8.
fn read_reply<S: Stream>(transport: &mut Transport<S>) -> Result<String> {
    let mut buf = [0u8; 4096];
    let mut out = Vec::new();
    loop {
        let n = transport.read_available(&mut buf)?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

enum InstallState {
    Streaming,
    Terminal(bool),
    Finished,
}

/// Streams the package payload after OKAY, half-closes, then reads the
/// verdict. Yields progress, a terminal `Progress(1.0)`, then
/// `Done(success)`.
pub struct InstallSession<S: Stream> {
    transport: Transport<S>,
    source: File,
    total: u64,
    sent: u64,
    buf: Vec<u8>,
    state: InstallState,
    reject_failure: bool,
}

impl<S: Stream> InstallSession<S> {
    fn new(transport: Transport<S>, source: File, total: u64, reject_failure: bool) -> Self {
        Self {
            transport,
            source,
            total,
            sent: 0,
            buf: vec![0u8; MAX_FILE_PACKET_LENGTH],
            state: InstallState::Streaming,
            reject_failure,
        }
    }

    fn step(&mut self) -> Result<TransferEvent<bool>> {
        let n = self.source.read(&mut self.buf)?;
        if n == 0 {
            self.transport.half_close()?;
            let reply = read_reply(&mut self.transport)?;
            trace!("install verdict: {}", reply.trim());
            let success = is_success_reply(&reply);
            if self.reject_failure && !success {
                return Err(AdbError::RequestRejected(reply));
            }
            self.state = InstallState::Terminal(success);
            return Ok(TransferEvent::Progress(1.0));
        }
        self.transport.write_all(&self.buf[..n])?;
        self.sent += n as u64;
        let progress = if self.total == 0 {
            1.0
        } else {
            (self.sent as f64 / self.total as f64).min(1.0)
        };
        Ok(TransferEvent::Progress(progress))
    }
}

impl<S: Stream> Iterator for InstallSession<S> {
    type Item = Result<TransferEvent<bool>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            InstallState::Finished => None,
            InstallState::Terminal(success) => {
                self.state = InstallState::Finished;
                Some(Ok(TransferEvent::Done(success)))
            }
            InstallState::Streaming => match self.step() {
                Ok(event) => Some(Ok(event)),
                Err(err) => {
                    self.state = InstallState::Finished;
                    self.transport.close();
                    Some(Err(err))
                }
            },
        }
    }
}

/// [`InstallSession`] with the unit output the write-individual flow wants.
pub struct InstallWriteSession<S: Stream> {
    inner: InstallSession<S>,
}

impl<S: Stream> Iterator for InstallWriteSession<S> {
    type Item = Result<TransferEvent<()>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Ok(TransferEvent::Progress(p)) => Some(Ok(TransferEvent::Progress(p))),
            Ok(TransferEvent::Done(_)) => Some(Ok(TransferEvent::Done(()))),
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::drain;
    use crate::test_stream::ScriptedStream;
    use std::io::Write as _;

    fn fixture(dir: &tempfile::TempDir, name: &str, len: usize) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&vec![0x5Au8; len]).unwrap();
        path
    }

    fn features(list: &[Feature]) -> FeatureSet {
        list.iter().copied().collect()
    }

    #[test]
    fn install_write_payload_via_cmd() {
        let dir = tempfile::tempdir().unwrap();
        let apk = fixture(&dir, "sample-fake.apk", 614);
        let req = InstallWrite::new(
            &apk,
            "session-id",
            features(&[Feature::Cmd]),
            ConnectionTarget::Any,
        );
        assert!(req.validate().ok);
        assert_eq!(
            req.serialize(),
            b"0042exec:cmd package install-write -S 614 session-id sample-fake.apk -"
        );
    }

    #[test]
    fn install_write_payload_via_abb_exec() {
        let dir = tempfile::tempdir().unwrap();
        let apk = fixture(&dir, "sample-fake.apk", 614);
        let req = InstallWrite::new(
            &apk,
            "session-id",
            features(&[Feature::Cmd, Feature::AbbExec]),
            ConnectionTarget::Any,
        );
        assert_eq!(
            req.serialize(),
            b"0042abb_exec:package\0install-write\0-S\0614\0session-id\0sample-fake.apk\0-"
        );
    }

    #[test]
    fn install_write_payload_via_legacy_pm() {
        let dir = tempfile::tempdir().unwrap();
        let apk = fixture(&dir, "sample-fake.apk", 614);
        let req = InstallWrite::new(&apk, "session-id", FeatureSet::new(), ConnectionTarget::Any);
        assert_eq!(
            req.serialize(),
            b"0039exec:pm install-write -S 614 session-id sample-fake.apk -"
        );
    }

    #[test]
    fn single_shot_payload_and_gating() {
        let dir = tempfile::tempdir().unwrap();
        let apk = fixture(&dir, "app.apk", 1000);

        let cmd_only = InstallPackage::new(&apk, features(&[Feature::Cmd]), ConnectionTarget::Any);
        assert!(cmd_only.validate().ok);
        assert_eq!(cmd_only.body(), b"exec:cmd package install -S 1000");

        let abb = InstallPackage::new(
            &apk,
            features(&[Feature::Cmd, Feature::AbbExec]),
            ConnectionTarget::Any,
        )
        .reinstall();
        assert_eq!(abb.body(), b"abb_exec:package\0install\0-r\0-S\01000");

        let neither = InstallPackage::new(&apk, FeatureSet::new(), ConnectionTarget::Any);
        let v = neither.validate();
        assert!(!v.ok);
        assert!(v.message.unwrap().contains("neither cmd nor abb_exec"));
    }

    #[test]
    fn extra_args_are_quoted_for_cmd_and_split_for_abb() {
        let dir = tempfile::tempdir().unwrap();
        let apk = fixture(&dir, "app.apk", 10);

        let cmd = InstallPackage::new(&apk, features(&[Feature::Cmd]), ConnectionTarget::Any)
            .with_extra_args(["--fastdeploy", "it's"]);
        assert_eq!(
            cmd.body(),
            b"exec:cmd package install '--fastdeploy it\\'s' -S 10"
        );

        let abb = InstallPackage::new(&apk, features(&[Feature::AbbExec]), ConnectionTarget::Any)
            .with_extra_args(["--fastdeploy", "it's"]);
        assert_eq!(
            abb.body(),
            b"abb_exec:package\0install\0--fastdeploy\0it's\0-S\010"
        );
    }

    #[test]
    fn apex_requires_the_feature() {
        let dir = tempfile::tempdir().unwrap();
        let apex = fixture(&dir, "mod.apex", 20);

        let denied = InstallPackage::new(&apex, features(&[Feature::Cmd]), ConnectionTarget::Any);
        assert!(!denied.validate().ok);

        let allowed = InstallPackage::new(
            &apex,
            features(&[Feature::Cmd, Feature::Apex]),
            ConnectionTarget::Any,
        );
        assert!(allowed.validate().ok);
        assert_eq!(allowed.body(), b"exec:cmd package install -S 20 --apex");
    }

    #[test]
    fn rejects_non_package_files() {
        let dir = tempfile::tempdir().unwrap();
        let zip = fixture(&dir, "rom.zip", 64);
        let req = InstallPackage::new(&zip, features(&[Feature::Cmd]), ConnectionTarget::Any);
        assert!(!req.validate().ok);

        let missing = InstallPackage::new(
            dir.path().join("ghost.apk"),
            features(&[Feature::Cmd]),
            ConnectionTarget::Any,
        );
        assert!(!missing.validate().ok);
    }

    #[test]
    fn session_streams_payload_and_parses_success() {
        let dir = tempfile::tempdir().unwrap();
        let apk = fixture(&dir, "app.apk", 614);
        let req = InstallPackage::new(&apk, features(&[Feature::Cmd]), ConnectionTarget::Any);

        let (stream, capture) = ScriptedStream::with_capture(b"Success\n");
        let session = req.open(Transport::new(stream)).unwrap();
        let events: Vec<_> = session.map(|e| e.unwrap()).collect();
        assert_eq!(
            events,
            vec![
                TransferEvent::Progress(1.0),
                TransferEvent::Progress(1.0),
                TransferEvent::Done(true),
            ]
        );
        assert_eq!(capture.bytes(), vec![0x5Au8; 614]);
        assert!(capture.write_closed());
    }

    #[test]
    fn session_reports_failure_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let apk = fixture(&dir, "app.apk", 8);
        let req = InstallPackage::new(&apk, features(&[Feature::Cmd]), ConnectionTarget::Any);
        let session = req
            .open(Transport::new(ScriptedStream::replying(
                b"Failure [INSTALL_FAILED_INVALID_APK]",
            )))
            .unwrap();
        assert_eq!(drain(session).unwrap(), false);
    }

    #[test]
    fn write_individual_raises_on_failure_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let apk = fixture(&dir, "app.apk", 8);
        let req = InstallWrite::new(&apk, "sid", features(&[Feature::Cmd]), ConnectionTarget::Any);
        let session = req
            .open(Transport::new(ScriptedStream::replying(
                b"Failure [INSTALL_FAILED_ABORTED]",
            )))
            .unwrap();
        match drain(session).unwrap_err() {
            AdbError::RequestRejected(msg) => assert!(msg.contains("INSTALL_FAILED_ABORTED")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn create_session_parses_the_id() {
        let mut req = CreateInstallSession::new(features(&[Feature::Cmd]), ConnectionTarget::Any);
        assert_eq!(req.body(), b"exec:cmd package install-create");

        let mut t = Transport::new(ScriptedStream::replying(
            b"Success: created install session [1234567]\n",
        ));
        assert_eq!(req.read_result(&mut t).unwrap(), "1234567");

        let mut t = Transport::new(ScriptedStream::replying(b"Error: no space left\n"));
        assert!(matches!(
            req.read_result(&mut t).unwrap_err(),
            AdbError::RequestRejected(_)
        ));
    }

    #[test]
    fn commit_and_abandon_payloads() {
        let commit =
            CommitInstallSession::new("77", features(&[Feature::AbbExec]), ConnectionTarget::Any);
        assert_eq!(commit.body(), b"abb_exec:package\0install-commit\x0077");

        let abandon = AbandonInstallSession::new("77", FeatureSet::new(), ConnectionTarget::Any);
        assert_eq!(abandon.body(), b"exec:pm install-abandon 77");

        let mut commit = commit;
        let mut t = Transport::new(ScriptedStream::replying(b"Success\n"));
        assert!(commit.read_result(&mut t).unwrap());
    }

    #[test]
    fn success_prefix_rule() {
        assert!(is_success_reply("Success"));
        assert!(is_success_reply("  Success\nWARNING: something benign"));
        assert!(!is_success_reply("pm: Success")); // preceded by other output
        assert!(!is_success_reply("Failure [INSTALL_FAILED_OLDER_SDK]"));
    }
}
