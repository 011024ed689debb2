//! I/O helpers for packager commands.

pub mod config;
pub mod exploded;
