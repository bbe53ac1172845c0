// SPDX-License-Identifier: PMPL-1.0-or-later

//! Apport on-disk report encoding and console output

use crate::report::Report;
use colored::*;
use std::path::Path;

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Encode a report in apport's RFC 822-like format.
    ///
    /// Multi-line values start on the line after the key with every newline
    /// followed by one space, so a trailing newline survives as a lone space
    /// line.
    pub fn apport(&self, report: &Report) -> String {
        let mut out = String::new();
        for (key, value) in report.iter() {
            if value.contains('\n') {
                out.push_str(key);
                out.push_str(":\n ");
                out.push_str(&value.replace('\n', "\n "));
                out.push('\n');
            } else {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value);
                out.push('\n');
            }
        }
        out
    }

    pub fn print_written(&self, path: &Path) {
        println!("{} {}", "Report written to:".green(), path.display());
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
