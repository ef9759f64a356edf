// CRC-32 checksums over byte buffers.
//
// UPS uses CRC-32/ISO-HDLC (reflected polynomial 0xEDB88320, initial
// value 0xFFFFFFFF, final XOR 0xFFFFFFFF) for all three integrity
// fields. `crc32fast` implements exactly this variant; the table state
// it keeps is process-wide and read-only.

/// Compute the CRC-32 of a byte buffer.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Check a buffer against an expected CRC-32.
#[inline]
pub fn verify_crc32(data: &[u8], expected: u32) -> bool {
    crc32(data) == expected
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
