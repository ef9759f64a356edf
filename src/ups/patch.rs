// UPS patch model: in-memory representation, serialization, parsing.
//
// Wire layout:
//
//   offset 0      : 4 bytes, ASCII "UPS1"
//   offset 4      : varint input size, varint output size
//                 : repeated { varint gap, xor bytes, 0x00 } until body end
//   offset EOF-12 : CRC-32 of the original file (LE)
//   offset EOF-8  : CRC-32 of the modified file (LE)
//   offset EOF-4  : CRC-32 of this patch file over bytes [0, EOF-4) (LE)

use std::io::{self, Write};

use super::checksum;
use super::varint::{self, VarIntError};

/// UPS signature bytes.
pub const UPS_MAGIC: [u8; 4] = *b"UPS1";

/// Trailing checksum region: three 4-byte CRC-32 fields.
pub const FOOTER_LEN: usize = 12;

/// Read a byte, treating positions past the end of the buffer as 0x00.
///
/// The format's EOF rule: both builder and applier read the shorter file
/// as if it were zero-padded to the longer one's length.
#[inline]
pub(crate) fn padded_byte(buf: &[u8], pos: usize) -> u8 {
    buf.get(pos).copied().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// One unit of a patch body: a run of unchanged bytes followed by a run
/// of differing bytes stored as source-XOR-target.
///
/// `xor` is never empty and never contains 0x00 — a zero XOR result
/// means the two sides agree, which belongs to the gap, and the wire
/// format reads a literal 0x00 as the run terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffBlock {
    /// Unchanged bytes since the end of the previous block (or since
    /// file start for the first block).
    pub gap: u64,
    /// XOR of source and target over the differing run.
    pub xor: Vec<u8>,
}

/// A complete UPS patch.
///
/// Immutable once built by the builder or parsed from bytes; the sizes
/// and checksums are symmetric, swapping roles with the direction of
/// application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Exact byte length of the original file.
    pub input_size: u64,
    /// Exact byte length of the modified file.
    pub output_size: u64,
    /// Diff blocks in file order.
    pub blocks: Vec<DiffBlock>,
    /// CRC-32 of the original file.
    pub crc_input: u32,
    /// CRC-32 of the modified file.
    pub crc_output: u32,
    /// CRC-32 of the serialized patch, excluding this field's own bytes.
    pub crc_patch: u32,
}

impl Patch {
    /// Assemble a patch from its parts, computing the trailing patch CRC.
    pub fn new(
        input_size: u64,
        output_size: u64,
        blocks: Vec<DiffBlock>,
        crc_input: u32,
        crc_output: u32,
    ) -> Self {
        let mut patch = Patch {
            input_size,
            output_size,
            blocks,
            crc_input,
            crc_output,
            crc_patch: 0,
        };
        let mut prefix = Vec::with_capacity(patch.encoded_len() - 4);
        patch.encode_prefix(&mut prefix);
        patch.crc_patch = checksum::crc32(&prefix);
        patch
    }

    /// Total serialized length in bytes.
    pub fn encoded_len(&self) -> usize {
        let body: usize = self
            .blocks
            .iter()
            .map(|b| varint::sizeof_u64(b.gap) + b.xor.len() + 1)
            .sum();
        UPS_MAGIC.len()
            + varint::sizeof_u64(self.input_size)
            + varint::sizeof_u64(self.output_size)
            + body
            + FOOTER_LEN
    }

    /// Serialize every byte preceding the patch CRC field.
    fn encode_prefix(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&UPS_MAGIC);
        varint::push_u64(out, self.input_size);
        varint::push_u64(out, self.output_size);
        for block in &self.blocks {
            varint::push_u64(out, block.gap);
            out.extend_from_slice(&block.xor);
            out.push(0x00);
        }
        out.extend_from_slice(&self.crc_input.to_le_bytes());
        out.extend_from_slice(&self.crc_output.to_le_bytes());
    }

    /// Serialize the patch to a byte buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_prefix(&mut out);
        out.extend_from_slice(&self.crc_patch.to_le_bytes());
        out
    }

    /// Serialize the patch to a `Write` sink.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Parse a serialized patch.
    ///
    /// Checks structure first (signature, sizes, block framing), then the
    /// trailing patch CRC; any failure is fatal and yields no model.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < UPS_MAGIC.len() {
            return Err(ParseError::TruncatedPatch { offset: data.len() });
        }
        if data[..4] != UPS_MAGIC {
            return Err(ParseError::BadSignature {
                found: [data[0], data[1], data[2], data[3]],
            });
        }
        // Smallest valid patch: signature, two one-byte sizes, footer.
        if data.len() < UPS_MAGIC.len() + 2 + FOOTER_LEN {
            return Err(ParseError::TruncatedPatch { offset: data.len() });
        }

        let body_end = data.len() - FOOTER_LEN;
        let mut pos = UPS_MAGIC.len();

        let (input_size, n) = read_body_varint(data, pos, body_end)?;
        pos += n;
        let (output_size, n) = read_body_varint(data, pos, body_end)?;
        pos += n;

        let mut blocks = Vec::new();
        while pos < body_end {
            let (gap, n) = read_body_varint(data, pos, body_end)?;
            pos += n;

            let run_start = pos;
            let terminator = data[run_start..body_end].iter().position(|&b| b == 0x00);
            match terminator {
                None => return Err(ParseError::MalformedBlock { offset: run_start }),
                Some(0) => return Err(ParseError::MalformedBlock { offset: run_start }),
                Some(len) => {
                    blocks.push(DiffBlock {
                        gap,
                        xor: data[run_start..run_start + len].to_vec(),
                    });
                    pos = run_start + len + 1;
                }
            }
        }

        let crc_input = read_u32_le(data, body_end);
        let crc_output = read_u32_le(data, body_end + 4);
        let crc_patch = read_u32_le(data, body_end + 8);

        let actual = checksum::crc32(&data[..data.len() - 4]);
        if actual != crc_patch {
            return Err(ParseError::PatchChecksumMismatch {
                expected: crc_patch,
                actual,
            });
        }

        Ok(Patch {
            input_size,
            output_size,
            blocks,
            crc_input,
            crc_output,
            crc_patch,
        })
    }
}

/// Decode a varint confined to the patch body.
///
/// Running out of body bytes mid-varint means the patch was cut short;
/// an encoding past 64 bits is corruption.
fn read_body_varint(
    data: &[u8],
    pos: usize,
    body_end: usize,
) -> Result<(u64, usize), ParseError> {
    match varint::read_u64(&data[pos..body_end]) {
        Ok((value, len)) => Ok((value, len)),
        Err(VarIntError::Underflow) => Err(ParseError::TruncatedPatch { offset: pos }),
        Err(e @ VarIntError::Overflow) => Err(ParseError::MalformedVarInt {
            offset: pos,
            source: e,
        }),
    }
}

#[inline]
fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

// ---------------------------------------------------------------------------
// Parse error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The first four bytes are not "UPS1".
    BadSignature { found: [u8; 4] },
    /// The patch ends before a required field.
    TruncatedPatch { offset: usize },
    /// A size or gap field is not a valid varint.
    MalformedVarInt { offset: usize, source: VarIntError },
    /// An XOR run is empty or reaches the checksum region unterminated.
    MalformedBlock { offset: usize },
    /// The trailing patch CRC disagrees with the patch contents.
    PatchChecksumMismatch { expected: u32, actual: u32 },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::BadSignature { found } => {
                write!(
                    f,
                    "bad signature: expected \"UPS1\", got {:02X} {:02X} {:02X} {:02X}",
                    found[0], found[1], found[2], found[3]
                )
            }
            ParseError::TruncatedPatch { offset } => {
                write!(f, "truncated patch at offset {offset}")
            }
            ParseError::MalformedVarInt { offset, source } => {
                write!(f, "malformed varint at offset {offset}: {source}")
            }
            ParseError::MalformedBlock { offset } => {
                write!(f, "malformed block at offset {offset}")
            }
            ParseError::PatchChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "patch checksum mismatch: stored {expected:#010X}, computed {actual:#010X}"
                )
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::MalformedVarInt { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
