// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Client for Dell OpenManage Server Administrator storage reports
//!
//! Reports are requested through `omcliproxy` in the semicolon separated
//! (`-fmt ssv`) format, which prints one table per controller:
//!
//! ```text
//! Controller PERC H730P Mini (Embedded)
//! ID;Status;Name;State;...;Layout;Size;...;Device Name;Bus Protocol;Media;...
//! 0;Ok;OS;Ready;...;RAID-1;558.38 GB (599550590976 bytes);...;/dev/sda;SAS;HDD;...
//! ```

use std::{fmt, path::PathBuf};

use log::trace;

use crate::{Error, Runner};

const VDISK_ARGS: [&str; 5] = ["omreport", "storage", "vdisk", "-fmt", "ssv"];

/// Errors reported by the OpenManage client
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// No proxy executable was configured
    #[error("omcliproxy path is not set")]
    MissingProxy,

    /// Enhanced security mode needs an authenticated session
    #[error("enhanced security mode is not supported")]
    EnhancedSecurity,

    /// OpenManage itself reported an error
    #[error("omreport: {0}")]
    Tool(String),

    /// A table row does not line up with its header
    #[error("malformed row {line}: expected {expected} fields, found {found}")]
    Malformed { line: usize, expected: usize, found: usize },
}

/// Client settings
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to `omcliproxy`
    pub omcliproxy_path: PathBuf,
    /// Whether OpenManage runs with enhanced security enabled
    pub enhanced_security_mode: bool,
}

/// RAID layout of a virtual disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Concatenated,
    Raid0,
    Raid1,
    Raid5,
    Raid6,
    Raid10,
    Raid50,
    Raid60,
    /// Anything else, verbatim
    Other(String),
}

impl From<&str> for Layout {
    fn from(value: &str) -> Self {
        match value {
            "Concatenated" => Layout::Concatenated,
            "RAID-0" => Layout::Raid0,
            "RAID-1" => Layout::Raid1,
            "RAID-5" => Layout::Raid5,
            "RAID-6" => Layout::Raid6,
            "RAID-10" => Layout::Raid10,
            "RAID-50" => Layout::Raid50,
            "RAID-60" => Layout::Raid60,
            other => Layout::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Concatenated => f.write_str("Concatenated"),
            Layout::Raid0 => f.write_str("RAID-0"),
            Layout::Raid1 => f.write_str("RAID-1"),
            Layout::Raid5 => f.write_str("RAID-5"),
            Layout::Raid6 => f.write_str("RAID-6"),
            Layout::Raid10 => f.write_str("RAID-10"),
            Layout::Raid50 => f.write_str("RAID-50"),
            Layout::Raid60 => f.write_str("RAID-60"),
            Layout::Other(s) => f.write_str(s),
        }
    }
}

/// Media of the physical disks backing a virtual disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    Hdd,
    Ssd,
    /// Anything else, verbatim
    Other(String),
}

impl From<&str> for MediaType {
    fn from(value: &str) -> Self {
        match value {
            "HDD" => MediaType::Hdd,
            "SSD" => MediaType::Ssd,
            other => MediaType::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Hdd => f.write_str("HDD"),
            MediaType::Ssd => f.write_str("SSD"),
            MediaType::Other(s) => f.write_str(s),
        }
    }
}

/// One virtual disk from `omreport storage vdisk`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VDisk {
    /// Name of the owning controller (e.g. "PERC H730P Mini (Embedded)")
    pub controller: String,
    pub id: String,
    pub status: String,
    pub name: String,
    pub state: String,
    pub layout: Layout,
    pub size: String,
    /// OS device path (e.g. /dev/sda)
    pub device_name: String,
    pub bus_protocol: String,
    pub media_type: MediaType,
}

/// All virtual disks in the system
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VDiskReport {
    pub vdisks: Vec<VDisk>,
}

/// OpenManage report client
pub struct Reporter<'a, R> {
    config: Config,
    runner: &'a R,
}

impl<'a, R: Runner> Reporter<'a, R> {
    pub fn new(config: Config, runner: &'a R) -> Result<Self, ReportError> {
        if config.omcliproxy_path.as_os_str().is_empty() {
            return Err(ReportError::MissingProxy);
        }
        if config.enhanced_security_mode {
            return Err(ReportError::EnhancedSecurity);
        }
        Ok(Self { config, runner })
    }

    /// Fetches the virtual disk report
    pub fn storage_vdisk(&self) -> Result<VDiskReport, Error> {
        let raw = self.runner.run(&self.config.omcliproxy_path, &VDISK_ARGS)?;
        Ok(parse_vdisks(&String::from_utf8_lossy(&raw))?)
    }
}

/// Parses `omreport storage vdisk -fmt ssv` output
pub fn parse_vdisks(text: &str) -> Result<VDiskReport, ReportError> {
    let mut report = VDiskReport::default();
    let mut controller = String::new();
    let mut header: Option<Vec<&str>> = None;

    for (n, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            header = None;
        } else if line.starts_with("Error") {
            return Err(ReportError::Tool(line.trim_start_matches("Error!").trim().to_owned()));
        } else if let Some(name) = line.strip_prefix("Controller ") {
            controller = name.trim().to_owned();
        } else if line.starts_with("ID;") {
            header = Some(line.split(';').map(str::trim).collect());
        } else if let Some(columns) = &header {
            let fields: Vec<&str> = line.split(';').map(str::trim).collect();
            if fields.len() != columns.len() {
                return Err(ReportError::Malformed {
                    line: n + 1,
                    expected: columns.len(),
                    found: fields.len(),
                });
            }

            let get = |name: &str| -> &str {
                columns
                    .iter()
                    .position(|c| *c == name)
                    .map(|i| fields[i])
                    .unwrap_or_default()
            };
            let vdisk = VDisk {
                controller: controller.clone(),
                id: get("ID").to_owned(),
                status: get("Status").to_owned(),
                name: get("Name").to_owned(),
                state: get("State").to_owned(),
                layout: Layout::from(get("Layout")),
                size: get("Size").to_owned(),
                device_name: get("Device Name").to_owned(),
                bus_protocol: get("Bus Protocol").to_owned(),
                media_type: MediaType::from(get("Media")),
            };
            trace!("omreport vdisk: {vdisk:?}");
            report.vdisks.push(vdisk);
        }
    }

    Ok(report)
}
