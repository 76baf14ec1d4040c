// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Block device enrichment for disk inventory probes
//!
//! Fills RAID derived attributes into a block device description, without
//! overwriting anything another probe already filled in.

use log::{debug, error};

use crate::{board::BoardVendor, Resolver, Runner};

/// Configuration key of the RAID probe
pub const CONFIG_KEY: &str = "raid-probe";
/// Default display name of the RAID probe
pub const NAME: &str = "raid probe";
/// Position of the RAID probe among the other inventory probes
pub const PRIORITY: u32 = 6;

/// Attributes a probe may fill in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceAttributes {
    /// Drive type, receives the RAID level
    pub drive_type: String,
    /// Device type, receives the media type
    pub device_type: String,
}

/// The parts of a block device description the RAID probe reads and writes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDevice {
    /// Path to the device in /dev
    pub dev_path: String,
    pub attributes: DeviceAttributes,
}

/// Inventory probe backed by a [`Resolver`]
pub struct RaidProbe<R, B> {
    resolver: Resolver<R, B>,
}

impl<R: Runner, B: BoardVendor> RaidProbe<R, B> {
    pub fn new(resolver: Resolver<R, B>) -> Self {
        Self { resolver }
    }

    /// Fills empty attributes of `device` from its RAID metadata.
    ///
    /// Lookup failures are logged and leave the device untouched.
    pub fn fill_block_device_details(&self, device: &mut BlockDevice) {
        if device.dev_path.is_empty() {
            error!("Device path is empty, {NAME} will not fill disk details");
            return;
        }

        let disk = match self.resolver.resolve(&device.dev_path) {
            Ok(Some(disk)) => disk,
            Ok(None) => {
                debug!("No RAID metadata for {}", device.dev_path);
                return;
            }
            Err(e) => {
                error!("RAID lookup for {} failed: {e}", device.dev_path);
                return;
            }
        };

        let attrs = &mut device.attributes;
        if attrs.drive_type.is_empty() {
            attrs.drive_type = disk.raid_level;
            debug!("Disk: {} DriveType: {} filled by {NAME}", device.dev_path, attrs.drive_type);
        }
        if attrs.device_type.is_empty() {
            attrs.device_type = disk.media_type;
            debug!("Disk: {} DeviceType: {} filled by {NAME}", device.dev_path, attrs.device_type);
        }
    }
}
