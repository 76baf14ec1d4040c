// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Hardware RAID metadata lookup
//!
//! Identifies the vendor RAID controller sitting in front of a block device and
//! asks that vendor's management tool for the RAID level and media type of the
//! logical drive backing it.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod board;
pub mod catalog;
pub mod command;
pub mod config;
pub mod dell;
pub mod dispatch;
pub mod extract;
pub mod hp;
pub mod jsonpath;
pub mod mock;
pub mod omreport;
pub mod probe;
pub mod supermicro;

pub use catalog::{Catalog, UnsupportedVendor, Vendor};
pub use command::{ExecutionError, ProcessRunner, Runner};
pub use config::Config;
pub use dispatch::Resolver;

/// RAID metadata for a single OS block device.
///
/// Only ever built once the device has been found in a vendor tool's listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidDisk {
    /// OS device path (e.g. /dev/sda)
    #[serde(rename = "devPath")]
    pub device_path: String,
    /// RAID level in the vendor's own vocabulary
    #[serde(rename = "raid")]
    pub raid_level: String,
    /// Physical medium or interface classification reported by the vendor
    #[serde(rename = "mediatype")]
    pub media_type: String,
}

/// Common interface for vendor RAID tool adapters
pub trait Adapter {
    /// Find the logical drive exposed to the OS as `device` and describe it.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(disk))` if the vendor tool lists the device
    /// * `Ok(None)` if the tool ran but no drive matched
    /// * `Err(_)` if the tool could not be run
    fn locate(&self, device: &str) -> Result<Option<RaidDisk>, Error>;
}

/// Errors that can occur while looking up RAID metadata
#[derive(Debug, Error)]
pub enum Error {
    /// A vendor tool failed to run to completion
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Encoding or decoding JSON failed
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// An extraction pattern failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The board vendor has no registered tool
    #[error(transparent)]
    UnsupportedVendor(#[from] UnsupportedVendor),

    /// The structured reporting client failed
    #[error(transparent)]
    Report(#[from] omreport::ReportError),

    /// An I/O error occurred
    #[error("io: {0}")]
    IO(#[from] io::Error),
}

impl Error {
    /// Returns true if a vendor tool exceeded its time limit
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Execution(e) if e.is_timeout())
    }
}
