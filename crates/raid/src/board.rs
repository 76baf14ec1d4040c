// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Board vendor discovery via the sysfs DMI interface

use std::{
    fs, io,
    path::{Path, PathBuf},
};

const DMI_DIR: &str = "sys/class/dmi/id";

/// Source of the host's mainboard vendor string (e.g. "Dell Inc.")
pub trait BoardVendor {
    fn board_vendor(&self) -> io::Result<String>;
}

/// Reads the board vendor from `/sys/class/dmi/id/board_vendor`
#[derive(Debug, Clone)]
pub struct Dmi {
    sysroot: PathBuf,
}

impl Default for Dmi {
    fn default() -> Self {
        Self::in_sysroot("/")
    }
}

impl Dmi {
    /// Reads DMI attributes below an alternative system root
    pub fn in_sysroot(sysroot: impl AsRef<Path>) -> Self {
        Self {
            sysroot: sysroot.as_ref().to_owned(),
        }
    }
}

impl BoardVendor for Dmi {
    fn board_vendor(&self) -> io::Result<String> {
        read(&self.sysroot, Path::new(DMI_DIR), "board_vendor")
    }
}

/// A fixed vendor string, for hosts where DMI is unavailable or for tests
#[derive(Debug, Clone)]
pub struct Fixed(pub String);

impl BoardVendor for Fixed {
    fn board_vendor(&self) -> io::Result<String> {
        Ok(self.0.clone())
    }
}

/// Reads a sysfs attribute below `sysroot`, trimming the trailing newline
fn read(sysroot: &Path, node: &Path, key: &str) -> io::Result<String> {
    let path = sysroot.join(node).join(key);
    Ok(fs::read_to_string(path)?.trim().to_owned())
}
