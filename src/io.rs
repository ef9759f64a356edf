// File-level helpers for creating and applying UPS patches.
//
// UPS is a whole-file format: every operation reads its inputs fully
// into memory, runs the in-memory codec, and writes the result back
// out. Each helper returns a stats struct so callers (and the CLI) can
// report sizes, checksums and the detected direction.

use std::io;
use std::path::Path;

use log::debug;

use crate::engine::BuildError;
use crate::ups::applier::{self, ApplyError, Direction};
use crate::ups::builder;
use crate::ups::patch::Patch;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `create_file()`.
#[derive(Debug, Clone)]
pub struct CreateStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Target file size in bytes.
    pub target_size: u64,
    /// Serialized patch size in bytes.
    pub patch_size: u64,
    /// Number of diff blocks in the patch.
    pub blocks: u64,
    /// CRC-32 of the source file.
    pub crc_source: u32,
    /// CRC-32 of the target file.
    pub crc_target: u32,
}

/// Statistics returned by `apply_file()`.
#[derive(Debug, Clone)]
pub struct ApplyStats {
    /// Patch file size in bytes.
    pub patch_size: u64,
    /// Input file size in bytes.
    pub input_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Number of diff blocks applied.
    pub blocks: u64,
    /// Direction selected by the checksum protocol.
    pub direction: Direction,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug)]
pub enum IoError {
    /// I/O error (file open, read, write).
    Io(io::Error),
    /// Patch construction error.
    Build(BuildError),
    /// Patch parsing or application error.
    Apply(ApplyError),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Build(e) => write!(f, "build error: {e}"),
            Self::Apply(e) => write!(f, "apply error: {e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Build(e) => Some(e),
            Self::Apply(e) => Some(e),
        }
    }
}

impl From<io::Error> for IoError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<BuildError> for IoError {
    fn from(e: BuildError) -> Self {
        Self::Build(e)
    }
}

impl From<ApplyError> for IoError {
    fn from(e: ApplyError) -> Self {
        Self::Apply(e)
    }
}

// ---------------------------------------------------------------------------
// create_file
// ---------------------------------------------------------------------------

/// Diff a source file against a target file, writing a UPS patch to
/// `patch_path`.
pub fn create_file(
    source_path: &Path,
    target_path: &Path,
    patch_path: &Path,
) -> Result<CreateStats, IoError> {
    let source = std::fs::read(source_path)?;
    let target = std::fs::read(target_path)?;

    let patch = builder::build(&source, &target);
    let bytes = patch.to_bytes();
    std::fs::write(patch_path, &bytes)?;

    debug!(
        "created patch {}: {} blocks, {} bytes",
        patch_path.display(),
        patch.blocks.len(),
        bytes.len()
    );

    Ok(CreateStats {
        source_size: source.len() as u64,
        target_size: target.len() as u64,
        patch_size: bytes.len() as u64,
        blocks: patch.blocks.len() as u64,
        crc_source: patch.crc_input,
        crc_target: patch.crc_output,
    })
}

// ---------------------------------------------------------------------------
// apply_file
// ---------------------------------------------------------------------------

/// Apply a UPS patch file to an input file, writing the reconstruction
/// to `output_path`. Direction is detected from the input's checksum.
pub fn apply_file(
    patch_path: &Path,
    input_path: &Path,
    output_path: &Path,
) -> Result<ApplyStats, IoError> {
    let patch_bytes = std::fs::read(patch_path)?;
    let input = std::fs::read(input_path)?;

    let patch = Patch::parse(&patch_bytes).map_err(ApplyError::Parse)?;
    let (output, direction) = applier::apply(&patch, &input)?;
    std::fs::write(output_path, &output)?;

    debug!(
        "applied patch {} ({direction}): {} -> {} bytes",
        patch_path.display(),
        input.len(),
        output.len()
    );

    Ok(ApplyStats {
        patch_size: patch_bytes.len() as u64,
        input_size: input.len() as u64,
        output_size: output.len() as u64,
        blocks: patch.blocks.len() as u64,
        direction,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
