// High-level entry points over byte buffers.
//
// `build` and `apply` are the crate's two collaborator-facing
// operations: everything else (file reads, CLI flags, archive handling)
// lives outside the core. Both delegate to the `ups` modules and hold
// no state of their own; concurrent calls are independent.

use std::io::Write;

use crate::ups::applier::{self, ApplyError, Direction};
use crate::ups::builder;

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build a serialized UPS patch transforming `source` into `target`.
pub fn build(source: &[u8], target: &[u8]) -> Result<Vec<u8>, BuildError> {
    Ok(builder::build(source, target).to_bytes())
}

/// Build a patch and write it to a `Write` sink.
pub fn build_to<W: Write>(w: &mut W, source: &[u8], target: &[u8]) -> Result<(), BuildError> {
    builder::build(source, target)
        .write_to(w)
        .map_err(BuildError::Io)
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Apply a serialized patch to `input`.
///
/// Returns the reconstructed buffer and the direction the checksum
/// protocol selected: `Forward` if `input` was the original file,
/// `Reverse` if it was the modified one.
pub fn apply(patch: &[u8], input: &[u8]) -> Result<(Vec<u8>, Direction), ApplyError> {
    applier::apply_bytes(patch, input)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum BuildError {
    Io(std::io::Error),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
