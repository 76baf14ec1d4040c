// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Dell PERC support via the OpenManage report client

use std::path::Path;

use log::{debug, warn};

use crate::{
    omreport::{Config, Reporter},
    Adapter, Error, RaidDisk, Runner,
};

/// Adapter for Dell PERC controllers
pub struct Dell<'a, R> {
    exec: &'a Path,
    runner: &'a R,
}

impl<'a, R: Runner> Dell<'a, R> {
    pub fn new(exec: &'a Path, runner: &'a R) -> Self {
        Self { exec, runner }
    }
}

impl<R: Runner> Adapter for Dell<'_, R> {
    fn locate(&self, device: &str) -> Result<Option<RaidDisk>, Error> {
        let config = Config {
            omcliproxy_path: self.exec.to_owned(),
            enhanced_security_mode: false,
        };
        let report = Reporter::new(config, self.runner)?.storage_vdisk()?;

        let mut matches = report.vdisks.into_iter().filter(|v| v.device_name == device);
        let Some(first) = matches.next() else {
            return Ok(None);
        };
        for other in matches {
            warn!(
                "{device} is reported by virtual disk {} on {} and {} on {}, keeping the first",
                first.id, first.controller, other.id, other.controller
            );
        }

        debug!("{device} is virtual disk {} on {}", first.id, first.controller);
        let disk = RaidDisk {
            device_path: first.device_name,
            raid_level: first.layout.to_string(),
            media_type: first.media_type.to_string(),
        };

        Ok(Some(disk))
    }
}
