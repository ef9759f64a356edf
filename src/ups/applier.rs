// Patch applier: reconstruct one file from the other plus the patch.
//
// Direction is never stored in a patch. The applier computes the input
// buffer's CRC-32 and matches it against the patch's two file checksums:
// a hit on the original's checksum applies forward, a hit on the
// modified file's checksum applies the same blocks again to undo the
// transformation (XOR is self-inverse). Anything else is rejected
// before a single output byte is produced.

use super::checksum;
use super::patch::{ParseError, Patch, padded_byte};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which way a patch was applied, decided by checksum match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Input was the original file; output is the modified file.
    Forward,
    /// Input was the modified file; output is the original file.
    Reverse,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApplyError {
    /// The patch bytes are structurally invalid.
    Parse(ParseError),
    /// The input buffer matches neither file checksum in the patch.
    ChecksumMismatch {
        actual: u32,
        expected_input: u32,
        expected_output: u32,
    },
    /// The reconstructed buffer's checksum disagrees with the patch.
    ///
    /// The buffer is carried in the error so the caller can decide
    /// whether to keep it anyway.
    OutputVerification {
        output: Vec<u8>,
        direction: Direction,
        expected: u32,
        actual: u32,
    },
}

impl std::fmt::Display for ApplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyError::Parse(e) => write!(f, "invalid patch: {e}"),
            ApplyError::ChecksumMismatch {
                actual,
                expected_input,
                expected_output,
            } => write!(
                f,
                "input checksum {actual:#010X} matches neither the original \
                 ({expected_input:#010X}) nor the modified file ({expected_output:#010X})"
            ),
            ApplyError::OutputVerification {
                direction,
                expected,
                actual,
                ..
            } => write!(
                f,
                "{direction} output failed verification: expected {expected:#010X}, \
                 got {actual:#010X}"
            ),
        }
    }
}

impl std::error::Error for ApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplyError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for ApplyError {
    fn from(e: ParseError) -> Self {
        ApplyError::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Apply a parsed patch to `input`, returning the reconstructed buffer
/// and the detected direction. `input` is not modified.
pub fn apply(patch: &Patch, input: &[u8]) -> Result<(Vec<u8>, Direction), ApplyError> {
    let input_crc = checksum::crc32(input);
    let direction = if input_crc == patch.crc_input {
        Direction::Forward
    } else if input_crc == patch.crc_output {
        Direction::Reverse
    } else {
        return Err(ApplyError::ChecksumMismatch {
            actual: input_crc,
            expected_input: patch.crc_input,
            expected_output: patch.crc_output,
        });
    };

    let (out_len, expected_crc) = match direction {
        Direction::Forward => (patch.output_size, patch.crc_output),
        Direction::Reverse => (patch.input_size, patch.crc_input),
    };
    let out_len = out_len as usize;

    // Zero-filled so that gap and tail regions past the input's end
    // already hold the format's implied 0x00 bytes.
    let mut output = vec![0u8; out_len];
    let mut pos: usize = 0;

    for block in &patch.blocks {
        let gap = usize::try_from(block.gap).unwrap_or(usize::MAX);
        let gap_end = pos.saturating_add(gap);
        let copy_end = gap_end.min(out_len).min(input.len());
        if pos < copy_end {
            output[pos..copy_end].copy_from_slice(&input[pos..copy_end]);
        }
        pos = gap_end;

        for &x in &block.xor {
            if pos < out_len {
                output[pos] = padded_byte(input, pos) ^ x;
            }
            pos = pos.saturating_add(1);
        }
    }

    // Unchanged tail past the last block.
    let copy_end = out_len.min(input.len());
    if pos < copy_end {
        output[pos..copy_end].copy_from_slice(&input[pos..copy_end]);
    }

    let actual = checksum::crc32(&output);
    if actual != expected_crc {
        return Err(ApplyError::OutputVerification {
            output,
            direction,
            expected: expected_crc,
            actual,
        });
    }

    Ok((output, direction))
}

/// Parse raw patch bytes and apply them in one step.
pub fn apply_bytes(patch: &[u8], input: &[u8]) -> Result<(Vec<u8>, Direction), ApplyError> {
    let patch = Patch::parse(patch)?;
    apply(&patch, input)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ups::builder;
    use crate::ups::patch::DiffBlock;

    #[test]
    fn forward_and_reverse() {
        let source = b"ABCD";
        let target = b"ABXD";
        let patch = builder::build(source, target);

        let (out, dir) = apply(&patch, source).unwrap();
        assert_eq!(out, target);
        assert_eq!(dir, Direction::Forward);

        let (back, dir) = apply(&patch, target).unwrap();
        assert_eq!(back, source);
        assert_eq!(dir, Direction::Reverse);
    }

    #[test]
    fn input_is_not_mutated() {
        let source = b"ABCD".to_vec();
        let patch = builder::build(&source, b"ABXD");
        let before = source.clone();
        let _ = apply(&patch, &source).unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn growing_and_shrinking() {
        let source = b"AB";
        let target = b"ABCD";
        let patch = builder::build(source, target);

        let (out, dir) = apply(&patch, source).unwrap();
        assert_eq!(out, target);
        assert_eq!(dir, Direction::Forward);

        // Reverse shrinks the file back; the blocks past the output
        // length are dropped.
        let (back, dir) = apply(&patch, target).unwrap();
        assert_eq!(back, source);
        assert_eq!(dir, Direction::Reverse);
    }

    #[test]
    fn equal_file_patch_is_forward_both_ways() {
        let data = b"unchanged";
        let patch = builder::build(data, data);
        let (out, dir) = apply(&patch, data).unwrap();
        assert_eq!(out, data);
        assert_eq!(dir, Direction::Forward);
    }

    #[test]
    fn zero_extension_comes_from_the_tail_fill() {
        let patch = builder::build(b"abc", b"abc\x00\x00");
        assert!(patch.blocks.is_empty());
        let (out, dir) = apply(&patch, b"abc").unwrap();
        assert_eq!(out, b"abc\x00\x00");
        assert_eq!(dir, Direction::Forward);
    }

    #[test]
    fn wrong_input_is_rejected_without_output() {
        let patch = builder::build(b"ABCD", b"ABXD");
        let err = apply(&patch, b"EFGH").unwrap_err();
        match err {
            ApplyError::ChecksumMismatch {
                actual,
                expected_input,
                expected_output,
            } => {
                assert_eq!(actual, checksum::crc32(b"EFGH"));
                assert_eq!(expected_input, patch.crc_input);
                assert_eq!(expected_output, patch.crc_output);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_output_checksum_still_returns_buffer() {
        // Hand-assemble a patch whose stored output checksum cannot
        // match what its own blocks reconstruct.
        let source = b"ABCD";
        let patch = Patch::new(
            4,
            4,
            vec![DiffBlock {
                gap: 2,
                xor: vec![0x1B],
            }],
            checksum::crc32(source),
            0xDEAD_BEEF,
        );
        match apply(&patch, source) {
            Err(ApplyError::OutputVerification {
                output,
                direction,
                expected,
                actual,
            }) => {
                assert_eq!(output, b"ABXD");
                assert_eq!(direction, Direction::Forward);
                assert_eq!(expected, 0xDEAD_BEEF);
                assert_eq!(actual, checksum::crc32(b"ABXD"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn apply_bytes_parses_first() {
        let patch = builder::build(b"old data", b"new data").to_bytes();
        let (out, dir) = apply_bytes(&patch, b"old data").unwrap();
        assert_eq!(out, b"new data");
        assert_eq!(dir, Direction::Forward);

        let err = apply_bytes(b"not a patch at all!", b"old data").unwrap_err();
        assert!(matches!(err, ApplyError::Parse(_)));
    }
}
