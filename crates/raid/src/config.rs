// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Lookup configuration

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{command::ProcessRunner, extract::Extractor, Catalog, Error};

/// Environment variable enabling verbose tool logging when set to `y`
pub const DEBUG_ENV: &str = "RAIDSTAT_DEBUG";

/// Settings for a RAID lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log every tool invocation, its raw output and each parse result
    #[serde(default)]
    pub debug: bool,

    /// Vendor to tool mapping
    #[serde(default)]
    pub vendors: Catalog,
}

impl Config {
    /// Builds the default configuration, honouring `RAIDSTAT_DEBUG`
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Turns on debug output when `RAIDSTAT_DEBUG` is `y`; never turns it off
    pub fn with_env(self) -> Self {
        self.with_debug_value(env::var(DEBUG_ENV).ok().as_deref())
    }

    fn with_debug_value(mut self, value: Option<&str>) -> Self {
        self.debug |= value == Some("y");
        self
    }

    /// Parses a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Returns a process runner carrying this configuration's debug flag
    pub fn runner(&self) -> ProcessRunner {
        ProcessRunner::new(self.debug)
    }

    /// Returns an extractor carrying this configuration's debug flag
    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.debug)
    }
}
