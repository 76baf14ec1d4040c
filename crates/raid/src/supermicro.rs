// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Broadcom MegaRAID support via `storcli64`, as shipped on Supermicro boards
//!
//! `storcli` emits JSON when given the trailing `J` argument, so fields are read
//! with path queries rather than patterns.

use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use crate::{jsonpath, Adapter, Error, RaidDisk, Runner};

const CONTROLLER_COUNT: &str = "Controllers.#.Response Data.Number of Controllers";
const VIRTUAL_DRIVES: &str = "Controllers.#.Response Data.Virtual Drives.#.DG/VD";
const OS_DRIVE_NAME: &str = "Controllers.0.Response Data.VD* Properties.OS Drive Name";
const VD_TYPE: &str = "Controllers.0.Response Data./c*v*.#.TYPE";
const PD_MEDIA: &str = "Controllers.0.Response Data.PDs for VD *.#.Med";

/// Adapter for MegaRAID controllers
pub struct SuperMicro<'a, R> {
    exec: &'a Path,
    runner: &'a R,
}

impl<'a, R: Runner> SuperMicro<'a, R> {
    pub fn new(exec: &'a Path, runner: &'a R) -> Self {
        Self { exec, runner }
    }

    /// Runs `storcli` and parses its report; unparseable output reads as an empty document
    fn query(&self, args: &[&str]) -> Result<Value, Error> {
        let raw = self.runner.run(self.exec, args)?;
        match serde_json::from_slice(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!("Ignoring unparseable output of storcli {}: {e}", args.join(" "));
                Ok(Value::Null)
            }
        }
    }

    /// Number of controllers in the system, zero if the report omits it
    pub fn controllers(&self) -> Result<u64, Error> {
        let doc = self.query(&["show", "J"])?;
        let count = jsonpath::query_flat(&doc, CONTROLLER_COUNT)
            .first()
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Ok(count)
    }

    /// `DG/VD` pairs (e.g. "0/1") of every virtual drive across all controllers
    pub fn virtual_drives(&self) -> Result<Vec<String>, Error> {
        let doc = self.query(&["/call/vall", "show", "J"])?;
        let vds = jsonpath::query_flat(&doc, VIRTUAL_DRIVES)
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect();
        Ok(vds)
    }
}

impl<R: Runner> Adapter for SuperMicro<'_, R> {
    fn locate(&self, device: &str) -> Result<Option<RaidDisk>, Error> {
        let controllers = self.controllers()?;
        let vds = self.virtual_drives()?;

        let mut found: Option<(String, RaidDisk)> = None;
        for ctrl in 0..controllers {
            for vd in &vds {
                let Some((_, index)) = vd.split_once('/') else {
                    warn!("Skipping malformed virtual drive id '{vd}'");
                    continue;
                };

                let target = format!("/c{ctrl}/v{index}");
                let doc = self.query(&[&target, "show", "all", "J"])?;
                if jsonpath::query_str(&doc, OS_DRIVE_NAME) != device {
                    continue;
                }

                if let Some((first, _)) = &found {
                    warn!("{device} is reported by both {first} and {target}, keeping {first}");
                    continue;
                }

                debug!("{device} is virtual drive {target}");
                let first_str = |path: &str| {
                    jsonpath::query_flat(&doc, path)
                        .first()
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                        .unwrap_or_default()
                };
                let disk = RaidDisk {
                    device_path: device.to_owned(),
                    raid_level: first_str(VD_TYPE),
                    media_type: first_str(PD_MEDIA),
                };
                found = Some((target, disk));
            }
        }

        Ok(found.map(|(_, disk)| disk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::Scripted;

    const STORCLI: &str = "/opt/MegaRAID/storcli/storcli64";

    fn megaraid() -> Scripted {
        Scripted::new()
            .respond("show J", include_str!("../tests/fixtures/storcli_show.json"))
            .respond(
                "/call/vall show J",
                include_str!("../tests/fixtures/storcli_call_vall_show.json"),
            )
            .respond(
                "/c0/v0 show all J",
                include_str!("../tests/fixtures/storcli_c0_v0_show_all.json"),
            )
            .respond(
                "/c0/v1 show all J",
                include_str!("../tests/fixtures/storcli_c0_v1_show_all.json"),
            )
            .respond(
                "/c1/v0 show all J",
                include_str!("../tests/fixtures/storcli_c1_v0_show_all.json"),
            )
            .respond(
                "/c1/v1 show all J",
                include_str!("../tests/fixtures/storcli_c1_v1_show_all.json"),
            )
    }

    #[test_log::test]
    fn test_enumeration() {
        let runner = megaraid();
        let sm = SuperMicro::new(Path::new(STORCLI), &runner);
        assert_eq!(sm.controllers().unwrap(), 2);
        assert_eq!(sm.virtual_drives().unwrap(), vec!["0/0", "0/1"]);
    }

    #[test_log::test]
    fn test_locate() {
        let runner = megaraid();
        let sm = SuperMicro::new(Path::new(STORCLI), &runner);
        let disk = sm.locate("/dev/sdb").unwrap().unwrap();
        assert_eq!(
            disk,
            RaidDisk {
                device_path: "/dev/sdb".into(),
                raid_level: "RAID5".into(),
                media_type: "HDD".into(),
            }
        );

        // Every controller and virtual drive pair is inspected
        assert_eq!(runner.calls().len(), 6);
        assert_eq!(
            runner.calls().last().unwrap(),
            "/opt/MegaRAID/storcli/storcli64 /c1/v1 show all J"
        );
    }

    #[test_log::test]
    fn test_locate_on_second_controller() {
        let runner = megaraid();
        let sm = SuperMicro::new(Path::new(STORCLI), &runner);
        let disk = sm.locate("/dev/sdd").unwrap().unwrap();
        assert_eq!(disk.raid_level, "RAID10");
        assert_eq!(disk.media_type, "HDD");
    }

    #[test_log::test]
    fn test_locate_absent() {
        let runner = megaraid();
        let sm = SuperMicro::new(Path::new(STORCLI), &runner);
        assert_eq!(sm.locate("/dev/sdz").unwrap(), None);
    }

    #[test_log::test]
    fn test_duplicate_keeps_first() {
        let runner = megaraid().respond(
            "/c1/v1 show all J",
            include_str!("../tests/fixtures/storcli_c0_v1_show_all.json").replace("RAID5", "RAID6"),
        );
        let sm = SuperMicro::new(Path::new(STORCLI), &runner);
        let disk = sm.locate("/dev/sdb").unwrap().unwrap();
        assert_eq!(disk.raid_level, "RAID5");
    }

    #[test_log::test]
    fn test_missing_fields_are_empty() {
        let detail = r#"{"Controllers": [{"Response Data": {"VD0 Properties": {"OS Drive Name": "/dev/sda"}}}]}"#;
        let runner = Scripted::new()
            .respond("show J", r#"{"Controllers": [{"Response Data": {"Number of Controllers": 1}}]}"#)
            .respond(
                "/call/vall show J",
                r#"{"Controllers": [{"Response Data": {"Virtual Drives": [{"DG/VD": "0/0"}]}}]}"#,
            )
            .respond("/c0/v0 show all J", detail);
        let sm = SuperMicro::new(Path::new(STORCLI), &runner);
        let disk = sm.locate("/dev/sda").unwrap().unwrap();
        assert_eq!(disk.raid_level, "");
        assert_eq!(disk.media_type, "");
    }

    #[test_log::test]
    fn test_no_controllers() {
        let runner = Scripted::new()
            .respond("show J", r#"{"Controllers": [{"Response Data": {}}]}"#)
            .respond("/call/vall show J", r#"{"Controllers": []}"#);
        let sm = SuperMicro::new(Path::new(STORCLI), &runner);
        assert_eq!(sm.locate("/dev/sda").unwrap(), None);
        assert_eq!(runner.calls().len(), 2);
    }

    #[test_log::test]
    fn test_unparseable_output() {
        let runner = Scripted::new()
            .respond("show J", "CLI Version = 007.1017.0000.0000")
            .respond("/call/vall show J", include_str!("../tests/fixtures/storcli_call_vall_show.json"));
        let sm = SuperMicro::new(Path::new(STORCLI), &runner);
        assert_eq!(sm.controllers().unwrap(), 0);
        assert_eq!(sm.locate("/dev/sda").unwrap(), None);
    }

    #[test_log::test]
    fn test_tool_failure_is_fatal() {
        let runner = Scripted::new().respond("show J", include_str!("../tests/fixtures/storcli_show.json"));
        let sm = SuperMicro::new(Path::new(STORCLI), &runner);
        assert!(matches!(sm.locate("/dev/sda"), Err(Error::Execution(_))));
    }
}
