// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::{error, info, warn};

use raid::{extract::to_json, Config, RaidDisk, Resolver};

/// Report the hardware RAID level and media type behind block devices
#[derive(Debug, Parser)]
#[command(name = "raidstat", version)]
struct Args {
    /// JSON configuration file (vendor tool paths, debug flag)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every tool invocation and its raw output
    #[arg(short, long)]
    debug: bool,

    /// Pretty-print with this many spaces per level (0 for compact)
    #[arg(short, long, default_value_t = 2)]
    indent: usize,

    /// Block devices to look up (e.g. /dev/sda)
    #[arg(required = true)]
    devices: Vec<String>,
}

/// Writes one record as JSON followed by a newline
fn print_record<W: Write>(out: &mut W, disk: &RaidDisk, indent: usize) -> Result<(), Box<dyn std::error::Error>> {
    out.write_all(&to_json(disk, indent)?)?;
    out.write_all(b"\n")?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config.with_env(),
            Err(e) => {
                eprintln!("raidstat: cannot load {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Config::from_env(),
    };
    config.debug |= args.debug;

    let level = if config.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    let resolver = Resolver::from_config(&config);
    let mut stdout = io::stdout().lock();
    let mut failed = false;

    for device in &args.devices {
        match resolver.resolve(device) {
            Ok(Some(disk)) => {
                info!("{device}: {} on {}", disk.raid_level, disk.media_type);
                if let Err(e) = print_record(&mut stdout, &disk, args.indent) {
                    error!("{device}: {e}");
                    failed = true;
                }
            }
            Ok(None) => warn!("{device}: no RAID metadata available"),
            Err(e) => {
                error!("{device}: {e}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
