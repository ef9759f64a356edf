// Patch builder: locate byte-level differences between two buffers.
//
// Single greedy pass over both buffers, reading the shorter one as
// zero-padded. Each maximal run of differing positions becomes one
// block; the unchanged distance before it becomes the block's gap.
// Equal positions are never folded into a run — an equal pair XORs to
// 0x00, which the wire format reads as the run terminator.

use super::checksum;
use super::patch::{DiffBlock, Patch, padded_byte};

/// Build a patch transforming `source` into `target`.
///
/// O(max(len)) time, single pass. Equal inputs yield an empty block
/// list with matching file checksums.
pub fn build(source: &[u8], target: &[u8]) -> Patch {
    let limit = source.len().max(target.len());
    let mut blocks = Vec::new();

    let mut run_end = 0; // position just past the previous run
    let mut pos = 0;
    while pos < limit {
        if padded_byte(source, pos) == padded_byte(target, pos) {
            pos += 1;
            continue;
        }

        let gap = (pos - run_end) as u64;
        let start = pos;
        while pos < limit && padded_byte(source, pos) != padded_byte(target, pos) {
            pos += 1;
        }
        let xor = (start..pos)
            .map(|i| padded_byte(source, i) ^ padded_byte(target, i))
            .collect();
        run_end = pos;
        blocks.push(DiffBlock { gap, xor });
    }

    Patch::new(
        source.len() as u64,
        target.len() as u64,
        blocks,
        checksum::crc32(source),
        checksum::crc32(target),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_differing_byte() {
        let patch = build(b"ABCD", b"ABXD");
        assert_eq!(patch.input_size, 4);
        assert_eq!(patch.output_size, 4);
        assert_eq!(patch.blocks.len(), 1);
        assert_eq!(patch.blocks[0].gap, 2);
        assert_eq!(patch.blocks[0].xor, vec![b'C' ^ b'X']);
    }

    #[test]
    fn equal_inputs_yield_no_blocks() {
        let patch = build(b"identical", b"identical");
        assert!(patch.blocks.is_empty());
        assert_eq!(patch.crc_input, patch.crc_output);
    }

    #[test]
    fn growing_target_xors_against_zero() {
        // Bytes past the source's end read as 0x00, so the tail run is
        // the raw target bytes.
        let patch = build(b"AB", b"ABCD");
        assert_eq!(patch.blocks.len(), 1);
        assert_eq!(patch.blocks[0].gap, 2);
        assert_eq!(patch.blocks[0].xor, b"CD".to_vec());
    }

    #[test]
    fn shrinking_target_covers_source_tail() {
        let patch = build(b"ABCD", b"AB");
        assert_eq!(patch.blocks.len(), 1);
        assert_eq!(patch.blocks[0].gap, 2);
        assert_eq!(patch.blocks[0].xor, b"CD".to_vec());
    }

    #[test]
    fn zero_tail_produces_no_run() {
        // A target that extends the source with zero bytes agrees with
        // the zero-padded source everywhere.
        let patch = build(b"abc", b"abc\x00\x00");
        assert!(patch.blocks.is_empty());
        assert_eq!(patch.input_size, 3);
        assert_eq!(patch.output_size, 5);
    }

    #[test]
    fn runs_split_on_equal_bytes() {
        let source = b"aaaaaaaaaa";
        let target = b"aaXXaaYYaa";
        let patch = build(source, target);
        assert_eq!(patch.blocks.len(), 2);
        assert_eq!(patch.blocks[0].gap, 2);
        assert_eq!(patch.blocks[0].xor.len(), 2);
        assert_eq!(patch.blocks[1].gap, 2);
        assert_eq!(patch.blocks[1].xor.len(), 2);
    }

    #[test]
    fn runs_never_contain_zero() {
        let source: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut target = source.clone();
        for i in (0..target.len()).step_by(7) {
            target[i] = target[i].wrapping_add(13);
        }
        let patch = build(&source, &target);
        assert!(!patch.blocks.is_empty());
        for block in &patch.blocks {
            assert!(!block.xor.is_empty());
            assert!(block.xor.iter().all(|&b| b != 0));
        }
    }

    #[test]
    fn empty_source() {
        let patch = build(b"", b"hi");
        assert_eq!(patch.input_size, 0);
        assert_eq!(patch.output_size, 2);
        assert_eq!(patch.blocks.len(), 1);
        assert_eq!(patch.blocks[0].gap, 0);
        assert_eq!(patch.blocks[0].xor, b"hi".to_vec());
    }

    #[test]
    fn both_empty() {
        let patch = build(b"", b"");
        assert!(patch.blocks.is_empty());
        assert_eq!(patch.input_size, 0);
        assert_eq!(patch.output_size, 0);
    }
}
