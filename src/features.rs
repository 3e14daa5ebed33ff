// Copyright (C) 2025 HasX
// Licensed under the GNU AGPL v3.0. See LICENSE file for details.
// Website: https://hasx.dev

//! Device feature negotiation. The server reports a comma-separated token
//! list per device (`host-serial:<serial>:features`); requests gate
//! themselves on a snapshot of that list.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

/// A protocol extension a device can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// `cmd` — the device has the `cmd` binary; installs can stream
    /// through `exec:cmd package`.
    Cmd,
    /// `abb` — App Binary Bridge available.
    Abb,
    /// `abb_exec` — abb with a raw exec channel; the cheapest install
    /// transport.
    AbbExec,
    /// `apex` — APEX packages can be installed.
    Apex,
    /// `shell_v2` — shell protocol 2 with separated stdout/stderr and an
    /// exit code.
    ShellV2,
    /// `stat_v2` — extended sync stat records.
    StatV2,
    /// `ls_v2` — extended sync directory listings.
    LsV2,
    /// `fixed_push_mkdir` — the device creates missing directories on push.
    FixedPushMkdir,
    /// `sendrecv_v2` — sync v2 send/recv framing.
    SendRecvV2,
}

impl Feature {
    /// The token as it appears on the wire.
    pub fn token(self) -> &'static str {
        match self {
            Feature::Cmd => "cmd",
            Feature::Abb => "abb",
            Feature::AbbExec => "abb_exec",
            Feature::Apex => "apex",
            Feature::ShellV2 => "shell_v2",
            Feature::StatV2 => "stat_v2",
            Feature::LsV2 => "ls_v2",
            Feature::FixedPushMkdir => "fixed_push_mkdir",
            Feature::SendRecvV2 => "sendrecv_v2",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "cmd" => Some(Feature::Cmd),
            "abb" => Some(Feature::Abb),
            "abb_exec" => Some(Feature::AbbExec),
            "apex" => Some(Feature::Apex),
            "shell_v2" => Some(Feature::ShellV2),
            "stat_v2" => Some(Feature::StatV2),
            "ls_v2" => Some(Feature::LsV2),
            "fixed_push_mkdir" => Some(Feature::FixedPushMkdir),
            "sendrecv_v2" => Some(Feature::SendRecvV2),
            _ => None,
        }
    }
}

/// A per-device, per-connection snapshot of advertised features. Cheap to
/// clone; gating logic takes it by value. Refreshing when the device
/// changes is the caller's responsibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    features: HashSet<Feature>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the server's comma-separated token list. Unknown tokens are
    /// dropped so newer servers keep working against this client.
    pub fn parse(list: &str) -> Self {
        let mut features = HashSet::new();
        for token in list.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match Feature::from_token(token) {
                Some(feature) => {
                    let _ = features.insert(feature);
                }
                None => debug!("dropping unknown feature token {:?}", token),
            }
        }
        Self { features }
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn insert(&mut self, feature: Feature) {
        let _ = self.features.insert(feature);
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The first of `wanted` missing from this snapshot, if any.
    pub fn first_missing(&self, wanted: &[Feature]) -> Option<Feature> {
        wanted.iter().copied().find(|f| !self.supports(*f))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self { features: iter.into_iter().collect() }
    }
}
