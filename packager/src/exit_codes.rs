//! Stable exit codes for packager CLI commands.

use crate::compose::ComposeError;

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid arguments, config, descriptors, or I/O failure.
pub const INVALID: i32 = 1;
/// The application package has a shape composition cannot handle.
pub const UNSUPPORTED: i32 = 2;
/// A composite holds more than one web module.
pub const AMBIGUOUS: i32 = 3;
/// The composite's web module is not a usable web unit.
pub const INCOMPATIBLE: i32 = 4;

/// Map an error chain to its exit code.
pub fn for_error(err: &anyhow::Error) -> i32 {
    let compose = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ComposeError>());
    match compose {
        Some(ComposeError::Unsupported(_)) => UNSUPPORTED,
        Some(ComposeError::AmbiguousNestedModule { .. }) => AMBIGUOUS,
        Some(ComposeError::IncompatibleNestedModule { .. }) => INCOMPATIBLE,
        _ => INVALID,
    }
}
