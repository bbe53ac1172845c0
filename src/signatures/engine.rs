// SPDX-License-Identifier: PMPL-1.0-or-later

//! Duplicate signature derivation from DKMS build logs

use crate::types::SignaturePolicy;
use chrono::{Datelike, Local};

/// Marker gcc and clang put on every hard error diagnostic
pub const COMPILER_ERROR_MARKER: &str = ": error:";

/// Text a build log carries when the compiler itself crashed
pub const SEGFAULT_MARKER: &str = "Segmentation fault";

/// Package identity and clock the signature is derived against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureContext {
    pub package: String,
    pub version: String,
    pub year: i32,
}

impl SignatureContext {
    /// Context stamped with the current local calendar year
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
            year: Local::now().year(),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }
}

pub struct SignatureEngine {
    policy: SignaturePolicy,
}

impl SignatureEngine {
    pub fn new(policy: SignaturePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SignaturePolicy {
        self.policy
    }

    /// Derive a duplicate signature from a full build log.
    ///
    /// `None` means no signature could be derived. An empty string is a real
    /// signature: a log whose every line was filtered out.
    pub fn derive(&self, log: &str, ctx: &SignatureContext) -> Option<String> {
        match self.policy {
            SignaturePolicy::WholeLog => Some(self.whole_log(log, ctx.year)),
            SignaturePolicy::FirstError => self.first_error(log, ctx),
        }
    }

    /// Log text with every line ending in `year` dropped.
    ///
    /// Lines are split on `'\n'` only, so a `\r` stays part of its line.
    /// Kept lines are newline-terminated; one trailing newline does not
    /// count as an extra empty line.
    fn whole_log(&self, log: &str, year: i32) -> String {
        if log.is_empty() {
            return String::new();
        }
        let year = year.to_string();
        let body = log.strip_suffix('\n').unwrap_or(log);
        let mut signature = String::with_capacity(log.len());
        for line in body.split('\n') {
            if line.ends_with(&year) {
                continue;
            }
            signature.push_str(line);
            signature.push('\n');
        }
        signature
    }

    /// `dkms:<package>:<version>:<first error line>`
    fn first_error(&self, log: &str, ctx: &SignatureContext) -> Option<String> {
        first_compiler_error(log)
            .map(|line| format!("dkms:{}:{}:{}", ctx.package, ctx.version, line))
    }
}

impl Default for SignatureEngine {
    fn default() -> Self {
        Self::new(SignaturePolicy::default())
    }
}

/// First line carrying a compiler error, trimmed
pub fn first_compiler_error(log: &str) -> Option<&str> {
    log.lines()
        .find(|line| line.contains(COMPILER_ERROR_MARKER))
        .map(str::trim)
}

/// Whether the build died on a segfault rather than a diagnosable error
pub fn is_segfault(log: &str) -> bool {
    log.contains(SEGFAULT_MARKER)
}
