// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Helpers for pulling fields out of human-formatted tool output

use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::Error;

/// Regex-driven field extraction over raw tool output
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    debug: bool,
}

impl Extractor {
    /// Creates an extractor; `debug` logs every pattern, result and input
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Returns the first capture group of the first match of `pattern`.
    ///
    /// An empty string means nothing matched.
    pub fn first(&self, raw: &[u8], pattern: &str) -> Result<String, Error> {
        let text = String::from_utf8_lossy(raw);
        let re = Regex::new(pattern)?;
        let result = re
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
            .unwrap_or_default();

        if self.debug {
            debug!("Regexp is '{pattern}'");
            debug!("Result is '{result}'");
            debug!("Input data is:\n'''\n{text}\n'''");
        }

        Ok(result)
    }

    /// Returns the first capture group of every match of `pattern` in document order
    pub fn all(&self, raw: &[u8], pattern: &str) -> Result<Vec<String>, Error> {
        let text = String::from_utf8_lossy(raw);
        let re = Regex::new(pattern)?;
        let results: Vec<String> = re
            .captures_iter(&text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
            .collect();

        if self.debug {
            debug!("Regexp is '{pattern}'");
            debug!("Result is '{results:?}'");
            debug!("Input data is:\n'''\n{text}\n'''");
        }

        Ok(results)
    }
}

/// Strips leading and trailing space characters only.
///
/// Tabs and newlines are kept: vendor tools pad columns with plain spaces.
pub fn trim_spaces(input: &str) -> &str {
    input.trim_matches(' ')
}

/// Serializes `value` to JSON; `indent == 0` is compact, otherwise pretty with `indent` spaces
pub fn to_json<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<Vec<u8>, Error> {
    if indent == 0 {
        return Ok(serde_json::to_vec(value)?);
    }

    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}
