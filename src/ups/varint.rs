// UPS variable-length integer encoding.
//
// Base-128, least-significant group first. Bits 0-6 of each byte carry
// payload; bit 7 set marks the terminal group. After each continuation
// group the encoder subtracts 1 from the shifted remainder, which makes
// the encoding canonical: every value has exactly one byte sequence.
// Shared by the size fields and every block gap in a UPS patch.

use std::io::{self, Read, Write};

/// Maximum encoded length for a 64-bit value (ceil(64/7) = 10).
pub const MAX_VARINT_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `u64` as a UPS variable-length integer into `buf`.
/// Returns the number of bytes written (1..=10).
///
/// Emits low 7 bits per group, subtracting 1 from the remainder after
/// each continuation group; the final group gets bit 7 set.
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let low = (num & 0x7F) as u8;
        num >>= 7;
        if num == 0 {
            buf[i] = low | 0x80;
            return i + 1;
        }
        buf[i] = low;
        num -= 1;
        i += 1;
    }
}

/// Encode a `u64` and append it to a byte vector.
pub fn push_u64(out: &mut Vec<u8>, num: u64) {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    out.extend_from_slice(&buf[..len]);
}

/// Encode a `u64` and write it to a `Write` sink.
pub fn write_u64<W: Write>(w: &mut W, num: u64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    w.write_all(&buf[..len])
}

/// Encode a `usize` and write it to a `Write` sink.
pub fn write_usize<W: Write>(w: &mut W, num: usize) -> io::Result<()> {
    write_u64(w, num as u64)
}

// ---------------------------------------------------------------------------
// Decoding from byte slices
// ---------------------------------------------------------------------------

/// Decode a `u64` from the start of a byte slice.
/// Returns `(value, bytes_consumed)` or an error.
///
/// Accumulates `group * 128^k` per group plus a `+128^k` correction for
/// each continuation, mirroring the encoder's decrement.
pub fn read_u64(data: &[u8]) -> Result<(u64, usize), VarIntError> {
    let mut value: u64 = 0;
    let mut shift: u64 = 1;
    for (i, &byte) in data.iter().enumerate() {
        let group = u64::from(byte & 0x7F)
            .checked_mul(shift)
            .ok_or(VarIntError::Overflow)?;
        value = value.checked_add(group).ok_or(VarIntError::Overflow)?;
        if byte & 0x80 != 0 {
            return Ok((value, i + 1));
        }
        shift = shift.checked_mul(128).ok_or(VarIntError::Overflow)?;
        value = value.checked_add(shift).ok_or(VarIntError::Overflow)?;
    }
    Err(VarIntError::Underflow)
}

/// Decode a `usize` from the start of a byte slice.
pub fn read_usize(data: &[u8]) -> Result<(usize, usize), VarIntError> {
    let (value, len) = read_u64(data)?;
    let value = usize::try_from(value).map_err(|_| VarIntError::Overflow)?;
    Ok((value, len))
}

// ---------------------------------------------------------------------------
// Decoding from `Read` (streaming)
// ---------------------------------------------------------------------------

/// Read a `u64` varint from a streaming source.
pub fn stream_read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut value: u64 = 0;
    let mut shift: u64 = 1;
    let mut buf = [0u8; 1];
    loop {
        r.read_exact(&mut buf)?;
        let byte = buf[0];
        let group = u64::from(byte & 0x7F)
            .checked_mul(shift)
            .ok_or(VarIntError::Overflow)?;
        value = value.checked_add(group).ok_or(VarIntError::Overflow)?;
        if byte & 0x80 != 0 {
            return Ok(value);
        }
        shift = shift.checked_mul(128).ok_or(VarIntError::Overflow)?;
        value = value.checked_add(shift).ok_or(VarIntError::Overflow)?;
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return the encoded byte-length of a `u64` value.
#[inline]
pub fn sizeof_u64(mut num: u64) -> usize {
    let mut len = 1;
    loop {
        num >>= 7;
        if num == 0 {
            return len;
        }
        num -= 1;
        len += 1;
    }
}

/// Return the encoded byte-length of a `usize` value.
#[inline]
pub fn sizeof_usize(num: usize) -> usize {
    sizeof_u64(num as u64)
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarIntError {
    /// Input ended before a terminating group was found.
    Underflow,
    /// Value would overflow a 64-bit integer.
    Overflow,
}

impl std::fmt::Display for VarIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarIntError::Underflow => write!(f, "varint underflow (truncated input)"),
            VarIntError::Overflow => write!(f, "varint overflow"),
        }
    }
}

impl std::error::Error for VarIntError {}

impl From<VarIntError> for io::Error {
    fn from(e: VarIntError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
