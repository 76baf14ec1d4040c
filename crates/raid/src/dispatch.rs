// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Selects the vendor adapter for this host and runs the lookup

use std::path::Path;

use log::{debug, warn};
use nix::unistd::geteuid;

use crate::{
    board::{BoardVendor, Dmi},
    command::ProcessRunner,
    dell::Dell,
    extract::{trim_spaces, Extractor},
    hp::Hp,
    supermicro::SuperMicro,
    Adapter, Catalog, Config, Error, RaidDisk, Runner, Vendor,
};

/// Resolves block devices to RAID metadata using the board vendor's tool
pub struct Resolver<R, B> {
    catalog: Catalog,
    runner: R,
    board: B,
    extract: Extractor,
}

impl Resolver<ProcessRunner, Dmi> {
    /// Creates a resolver that runs real tools and reads the vendor from DMI
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.vendors.clone(), config.runner(), Dmi::default(), config.extractor())
    }
}

impl<R: Runner, B: BoardVendor> Resolver<R, B> {
    pub fn new(catalog: Catalog, runner: R, board: B, extract: Extractor) -> Self {
        Self {
            catalog,
            runner,
            board,
            extract,
        }
    }

    /// Returns the lower-cased board vendor string
    pub fn board_vendor(&self) -> Result<String, Error> {
        let vendor = self.board.board_vendor()?;
        Ok(trim_spaces(&vendor).to_lowercase())
    }

    /// Builds the adapter for `vendor` driving the tool at `tool`
    pub fn adapter<'a>(&'a self, vendor: Vendor, tool: &'a Path) -> Box<dyn Adapter + 'a> {
        match vendor {
            Vendor::Hp => Box::new(Hp::new(tool, &self.runner, self.extract)),
            Vendor::Dell => Box::new(Dell::new(tool, &self.runner)),
            Vendor::Supermicro => Box::new(SuperMicro::new(tool, &self.runner)),
        }
    }

    /// Looks up RAID metadata for `device` (e.g. /dev/sda).
    ///
    /// An unknown or unreadable board vendor yields `Ok(None)`; only a failing
    /// vendor tool is an error.
    pub fn resolve(&self, device: &str) -> Result<Option<RaidDisk>, Error> {
        if !geteuid().is_root() {
            warn!("RAID lookup requires superuser privilege, results may be incomplete");
        }

        let vendor = match self.board_vendor() {
            Ok(vendor) => vendor,
            Err(e) => {
                warn!("Unable to determine board vendor: {e}");
                return Ok(None);
            }
        };

        let (vendor, tool) = match self.catalog.lookup(&vendor) {
            Ok(found) => found,
            Err(e) => {
                warn!("{e}");
                return Ok(None);
            }
        };

        debug!("Resolving {device} with {} ({vendor})", tool.display());
        self.adapter(vendor, tool).locate(device)
    }
}
