// SPDX-License-Identifier: PMPL-1.0-or-later

//! dkms-apport: problem reports for DKMS module build failures.
//!
//! Invoked by DKMS when a module fails to build. Given the module name,
//! version and optionally the target kernel, the hook:
//! 1. **Packaging**: finds the binary and source package that ship the
//!    module sources, and its installed version.
//! 2. **Build logs**: picks up `make.log` (and vendor logs) from the DKMS tree.
//! 3. **Signatures**: derives a duplicate signature so identical failures
//!    group together in the crash database.
//! 4. **Storage**: writes one complete apport report.

pub mod buildlog;
pub mod hook;
pub mod packaging;
pub mod report;
pub mod signatures;
pub mod storage;
pub mod telemetry;
pub mod types;
