// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Mapping from board vendor to RAID management tool

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The board vendor has no registered RAID tool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported board vendor '{0}', expected one of: hp | dell inc. | supermicro")]
pub struct UnsupportedVendor(pub String);

/// Board vendors with a supported RAID tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Vendor {
    /// HP Smart Array, driven through `ssacli`
    Hp,
    /// Dell PERC, driven through OpenManage `omcliproxy`
    Dell,
    /// Supermicro boards with Broadcom MegaRAID, driven through `storcli64`
    Supermicro,
}

impl Vendor {
    pub const ALL: [Vendor; 3] = [Vendor::Hp, Vendor::Dell, Vendor::Supermicro];

    /// Returns the lower-cased board vendor string this entry matches
    pub fn key(&self) -> &'static str {
        match self {
            Vendor::Hp => "hp",
            Vendor::Dell => "dell inc.",
            Vendor::Supermicro => "supermicro",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Vendor {
    type Err = UnsupportedVendor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Vendor::ALL
            .into_iter()
            .find(|v| v.key() == wanted)
            .ok_or(UnsupportedVendor(wanted))
    }
}

impl TryFrom<String> for Vendor {
    type Error = UnsupportedVendor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Vendor> for String {
    fn from(value: Vendor) -> Self {
        value.key().to_owned()
    }
}

/// Per-vendor tool locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    tools: BTreeMap<Vendor, PathBuf>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_iter([
            (Vendor::Hp, PathBuf::from("ssacli")),
            (Vendor::Dell, PathBuf::from("/opt/dell/srvadmin/sbin/omcliproxy")),
            (Vendor::Supermicro, PathBuf::from("/opt/MegaRAID/storcli/storcli64")),
        ])
    }
}

impl FromIterator<(Vendor, PathBuf)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (Vendor, PathBuf)>>(iter: I) -> Self {
        Self {
            tools: iter.into_iter().collect(),
        }
    }
}

impl Catalog {
    /// Returns the tool registered for `vendor`, if any
    pub fn tool(&self, vendor: Vendor) -> Option<&Path> {
        self.tools.get(&vendor).map(PathBuf::as_path)
    }

    /// Matches a board vendor string (case-insensitively) to a registered tool
    pub fn lookup(&self, board_vendor: &str) -> Result<(Vendor, &Path), UnsupportedVendor> {
        let vendor: Vendor = board_vendor.parse()?;
        self.tool(vendor)
            .map(|path| (vendor, path))
            .ok_or_else(|| UnsupportedVendor(vendor.key().to_owned()))
    }

    /// Iterates over the registered vendors and their tools
    pub fn iter(&self) -> impl Iterator<Item = (Vendor, &Path)> {
        self.tools.iter().map(|(v, p)| (*v, p.as_path()))
    }
}
