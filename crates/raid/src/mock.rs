// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Scripted tool runner for testing.
//!
//! This module provides a runner that answers from canned output so vendor
//! adapters can be exercised without the vendor tools or RAID hardware.

use std::{cell::RefCell, collections::HashMap, path::Path};

use crate::command::{command_line, ExecutionError, Runner};

/// Replays canned output keyed on the argument line (arguments joined by spaces).
///
/// Unscripted invocations fail as if the tool could not be started.
#[derive(Debug, Default)]
pub struct Scripted {
    responses: HashMap<String, Vec<u8>>,
    calls: RefCell<Vec<String>>,
}

impl Scripted {
    /// Creates a runner with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `args` with `output`
    pub fn respond(mut self, args: &str, output: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(args.to_owned(), output.into());
        self
    }

    /// Every invocation so far, as full command lines, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Runner for Scripted {
    fn run(&self, program: &Path, args: &[&str]) -> Result<Vec<u8>, ExecutionError> {
        let command = command_line(program, args);
        self.calls.borrow_mut().push(command.clone());

        self.responses
            .get(&args.join(" "))
            .cloned()
            .ok_or_else(|| ExecutionError::Spawn {
                command,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no scripted response"),
            })
    }
}
