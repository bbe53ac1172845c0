// SPDX-License-Identifier: PMPL-1.0-or-later

//! Duplicate signature detection for failed module builds

pub mod engine;

use crate::types::SignaturePolicy;

pub use engine::{first_compiler_error, is_segfault, SignatureContext, SignatureEngine};

/// Derive a duplicate signature from a build log under `policy`
pub fn derive_signature(
    log: &str,
    policy: SignaturePolicy,
    ctx: &SignatureContext,
) -> Option<String> {
    SignatureEngine::new(policy).derive(log, ctx)
}
