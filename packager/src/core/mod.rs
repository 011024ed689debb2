//! Deterministic, pure logic shared by the composer.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! packages and descriptors and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod layout;
pub mod merge;
pub mod modules;
pub mod types;
