//! Servlet protocol deployment packager.
//!
//! Injects a test-runner servlet into an application package so the package
//! can be deployed and driven over HTTP by an integration test harness. The
//! crate keeps a strict separation:
//!
//! - **[`archive`]** and **[`descriptor`]**: in-memory package trees and
//!   round-trippable deployment descriptors.
//! - **[`core`]**: pure, deterministic logic (classification, module search,
//!   descriptor merge). No I/O.
//! - **[`io`]**: config files and exploded package directories.
//!
//! [`compose`] ties them together; orchestration modules ([`assemble`],
//! [`inspect`]) coordinate composition with I/O to implement CLI commands.

pub mod archive;
pub mod assemble;
pub mod compose;
pub mod core;
pub mod descriptor;
pub mod exit_codes;
pub mod inspect;
pub mod io;
pub mod logging;
pub mod processor;
pub mod protocol;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
