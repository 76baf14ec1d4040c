// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! HP Smart Array support via `ssacli`
//!
//! `ssacli` only speaks human-formatted text, so every field is pulled out of
//! the report with a regular expression. The walk is controller slot, then
//! logical drive, then the owning array for the interface type.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    extract::{to_json, trim_spaces, Extractor},
    Adapter, Error, RaidDisk, Runner,
};

const CONTROLLER_SLOT: &str = r"in Slot (.*?)[\s]";
const LOGICAL_DRIVE: &str = r"logicaldrive (.*?)[\s]";

/// Fields of `ld <id> show detail` that we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalDriveStatus {
    pub array: String,
    pub status: String,
    pub size: String,
    #[serde(rename = "diskName")]
    pub disk_name: String,
    pub raid: String,
}

/// Fields of `array <id> show detail` that we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayStatus {
    #[serde(rename = "arrayId")]
    pub array_id: String,
    pub status: String,
    #[serde(rename = "interfacetype")]
    pub interface_type: String,
}

/// Adapter for HP Smart Array controllers
pub struct Hp<'a, R> {
    exec: &'a Path,
    runner: &'a R,
    extract: Extractor,
}

impl<'a, R: Runner> Hp<'a, R> {
    pub fn new(exec: &'a Path, runner: &'a R, extract: Extractor) -> Self {
        Self { exec, runner, extract }
    }

    /// Slot numbers of every controller in the system
    pub fn controller_ids(&self) -> Result<Vec<String>, Error> {
        let raw = self.runner.run(self.exec, &["ctrl", "all", "show"])?;
        self.extract.all(&raw, CONTROLLER_SLOT)
    }

    /// Logical drive numbers on the controller in `slot`
    pub fn logical_drive_ids(&self, slot: &str) -> Result<Vec<String>, Error> {
        let raw = self
            .runner
            .run(self.exec, &["ctrl", &format!("slot={slot}"), "ld", "all", "show"])?;
        self.extract.all(&raw, LOGICAL_DRIVE)
    }

    /// Detail of one logical drive, encoded as a JSON line
    pub fn logical_drive_status(&self, slot: &str, drive: &str) -> Result<Vec<u8>, Error> {
        let raw = self
            .runner
            .run(self.exec, &["ctrl", &format!("slot={slot}"), "ld", drive, "show", "detail"])?;

        let field = |pattern: &str| -> Result<String, Error> {
            Ok(trim_spaces(&self.extract.first(&raw, pattern)?).to_owned())
        };
        let status = LogicalDriveStatus {
            status: field(r"Status *: (.*)")?,
            size: field(r"Size *: (.*)")?,
            disk_name: field(r"Disk Name *: (.*)")?,
            array: field(r"[\s]{2}Array (.*?)[\s]")?,
            raid: field(r"Fault Tolerance *: (.*)")?,
        };

        json_line(&status)
    }

    /// Detail of one array, encoded as a JSON line
    pub fn array_status(&self, slot: &str, array: &str) -> Result<Vec<u8>, Error> {
        let raw = self
            .runner
            .run(self.exec, &["ctrl", &format!("slot={slot}"), "array", array, "show", "detail"])?;

        let status = ArrayStatus {
            array_id: array.to_owned(),
            status: trim_spaces(&self.extract.first(&raw, r"[\s]{2}Status: (.*)")?).to_owned(),
            interface_type: trim_spaces(&self.extract.first(&raw, r"Interface Type: (.*)")?).to_owned(),
        };

        json_line(&status)
    }

    /// Interface type (e.g. "SAS") of the disks making up `array`
    fn interface_type(&self, slot: &str, array: &str) -> Result<String, Error> {
        let status: ArrayStatus = serde_json::from_slice(&self.array_status(slot, array)?)?;
        Ok(status.interface_type)
    }
}

impl<R: Runner> Adapter for Hp<'_, R> {
    fn locate(&self, device: &str) -> Result<Option<RaidDisk>, Error> {
        for slot in self.controller_ids()? {
            for drive in self.logical_drive_ids(&slot)? {
                let ld: LogicalDriveStatus = serde_json::from_slice(&self.logical_drive_status(&slot, &drive)?)?;
                if ld.disk_name != device {
                    continue;
                }

                debug!("{device} is logical drive {drive} of array {} in slot {slot}", ld.array);
                return Ok(Some(RaidDisk {
                    media_type: self.interface_type(&slot, &ld.array)?,
                    device_path: ld.disk_name,
                    raid_level: ld.raid,
                }));
            }
        }

        Ok(None)
    }
}

fn json_line<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    let mut line = to_json(value, 0)?;
    line.push(b'\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::Scripted;

    const SSACLI: &str = "/usr/sbin/ssacli";

    fn smart_array() -> Scripted {
        Scripted::new()
            .respond("ctrl all show", include_str!("../tests/fixtures/ssacli_ctrl_all_show.txt"))
            .respond(
                "ctrl slot=0 ld all show",
                include_str!("../tests/fixtures/ssacli_slot0_ld_all_show.txt"),
            )
            .respond(
                "ctrl slot=1 ld all show",
                include_str!("../tests/fixtures/ssacli_slot1_ld_all_show.txt"),
            )
            .respond(
                "ctrl slot=0 ld 1 show detail",
                include_str!("../tests/fixtures/ssacli_slot0_ld1_detail.txt"),
            )
            .respond(
                "ctrl slot=1 ld 1 show detail",
                include_str!("../tests/fixtures/ssacli_slot1_ld1_detail.txt"),
            )
            .respond(
                "ctrl slot=1 ld 2 show detail",
                include_str!("../tests/fixtures/ssacli_slot1_ld2_detail.txt"),
            )
            .respond(
                "ctrl slot=0 array A show detail",
                include_str!("../tests/fixtures/ssacli_slot0_array_a_detail.txt"),
            )
            .respond(
                "ctrl slot=1 array B show detail",
                include_str!("../tests/fixtures/ssacli_slot1_array_b_detail.txt"),
            )
    }

    #[test_log::test]
    fn test_enumeration() {
        let runner = smart_array();
        let hp = Hp::new(Path::new(SSACLI), &runner, Extractor::default());
        assert_eq!(hp.controller_ids().unwrap(), vec!["0", "1"]);
        assert_eq!(hp.logical_drive_ids("1").unwrap(), vec!["1", "2"]);
    }

    #[test_log::test]
    fn test_logical_drive_status() {
        let runner = smart_array();
        let hp = Hp::new(Path::new(SSACLI), &runner, Extractor::new(true));
        let json = hp.logical_drive_status("0", "1").unwrap();
        assert_eq!(json.last(), Some(&b'\n'));

        let ld: LogicalDriveStatus = serde_json::from_slice(&json).unwrap();
        assert_eq!(
            ld,
            LogicalDriveStatus {
                array: "A".into(),
                status: "OK".into(),
                size: "558.88 GB".into(),
                disk_name: "/dev/sda".into(),
                raid: "1".into(),
            }
        );
    }

    #[test_log::test]
    fn test_locate_second_controller() {
        let runner = smart_array();
        let hp = Hp::new(Path::new(SSACLI), &runner, Extractor::default());
        let disk = hp.locate("/dev/sdc").unwrap().unwrap();
        assert_eq!(
            disk,
            RaidDisk {
                device_path: "/dev/sdc".into(),
                raid_level: "5".into(),
                media_type: "Solid State SATA".into(),
            }
        );
        assert_eq!(
            runner.calls().last().unwrap(),
            "/usr/sbin/ssacli ctrl slot=1 array B show detail"
        );
    }

    #[test_log::test]
    fn test_first_match_stops_walk() {
        let runner = smart_array();
        let hp = Hp::new(Path::new(SSACLI), &runner, Extractor::default());
        let disk = hp.locate("/dev/sda").unwrap().unwrap();
        assert_eq!(disk.raid_level, "1");
        assert_eq!(disk.media_type, "SAS");
        assert!(!runner.calls().iter().any(|c| c.contains("slot=1")));
    }

    #[test_log::test]
    fn test_locate_absent() {
        let runner = smart_array();
        let hp = Hp::new(Path::new(SSACLI), &runner, Extractor::default());
        assert_eq!(hp.locate("/dev/sdz").unwrap(), None);
        // Every logical drive was inspected, no array detail was needed
        assert_eq!(runner.calls().len(), 6);
    }

    #[test_log::test]
    fn test_minimal_report() {
        let detail = concat!(
            "   Array A\n",
            "      Logical Drive: 1\n",
            "         Size: 100 GB\n",
            "         Fault Tolerance: RAID 1\n",
            "         Status: OK\n",
            "         Disk Name: X\n",
        );
        let runner = Scripted::new()
            .respond("ctrl all show", "Smart Array P410i in Slot 3 (Embedded)\n")
            .respond("ctrl slot=3 ld all show", "      logicaldrive 7 (100 GB, RAID 1, OK)\n")
            .respond("ctrl slot=3 ld 7 show detail", detail)
            .respond("ctrl slot=3 array A show detail", "   Array: A\n      Interface Type: SAS\n      Status: OK\n");
        let hp = Hp::new(Path::new(SSACLI), &runner, Extractor::default());

        let disk = hp.locate("X").unwrap().unwrap();
        assert_eq!(
            disk,
            RaidDisk {
                device_path: "X".into(),
                raid_level: "RAID 1".into(),
                media_type: "SAS".into(),
            }
        );
        assert!(runner.calls().contains(&format!("{SSACLI} ctrl slot=3 array A show detail")));
        assert_eq!(hp.locate("Y").unwrap(), None);
    }

    #[test_log::test]
    fn test_tool_failure_is_fatal() {
        let runner = Scripted::new().respond("ctrl all show", include_str!("../tests/fixtures/ssacli_ctrl_all_show.txt"));
        let hp = Hp::new(Path::new(SSACLI), &runner, Extractor::default());
        assert!(matches!(hp.locate("/dev/sda"), Err(Error::Execution(_))));
    }

    #[test]
    fn test_transport_round_trip() {
        let ld = LogicalDriveStatus {
            array: "B".into(),
            status: "OK".into(),
            size: "3.27 TB".into(),
            disk_name: "/dev/sdc".into(),
            raid: "5".into(),
        };
        let decoded: LogicalDriveStatus = serde_json::from_slice(&json_line(&ld).unwrap()).unwrap();
        assert_eq!(decoded, ld);

        let value: serde_json::Value = serde_json::from_slice(&json_line(&ld).unwrap()).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["array", "diskName", "raid", "size", "status"]);
    }
}
