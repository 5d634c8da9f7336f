//! Shard region codecs
//!
//! Every output byte of an encode or decode is
//! `XOR over sources of (coefficient * source_byte)`. A target is produced by
//! one "set" pass for its first source followed by one "xor" pass per
//! remaining source, so target buffers never need zeroing.
//!
//! ## Key Components
//!
//! - **`RegionCodec`**: the two region primitives behind a trait object
//! - **`WriteOp`**: operation mode (direct write vs XOR accumulate)
//! - **`ScalarCodec`** / **`UnrolledCodec`**: portable implementations
//! - [`Ssse3Codec`](super::simd::Ssse3Codec): x86_64 nibble-shuffle implementation
//!
//! All codecs produce byte-identical output; batching is purely a throughput
//! concern.

use super::error::{RsError, RsResult};
use super::galois::FIELD_SIZE;
use super::simd;
use std::fmt;

/// Specifies how to combine the multiplication result with the output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Direct write: output = coefficient * input (replaces contents)
    Direct,
    /// Accumulate: output = output XOR (coefficient * input)
    Add,
}

/// Implementation behind a [`RegionCodec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    Scalar,
    Unrolled,
    Ssse3,
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodecKind::Scalar => "scalar",
            CodecKind::Unrolled => "unrolled",
            CodecKind::Ssse3 => "ssse3",
        };
        f.write_str(name)
    }
}

/// Table-driven multiply of one source region into one target region
///
/// `table` is the multiplication table row of a fixed coefficient.
/// `source` and `target` are the already-sliced active byte ranges and must
/// have equal length.
pub trait RegionCodec: Send + Sync {
    fn kind(&self) -> CodecKind;

    /// `target[i] = table[source[i]]`
    fn apply_set(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8]);

    /// `target[i] ^= table[source[i]]`
    fn apply_xor(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8]);
}

/// Scalar multiply with configurable write mode
#[inline]
pub(crate) fn mul_slice_scalar(
    table: &[u8; FIELD_SIZE],
    source: &[u8],
    target: &mut [u8],
    op: WriteOp,
) {
    debug_assert_eq!(source.len(), target.len());
    match op {
        WriteOp::Direct => {
            for (out, &byte) in target.iter_mut().zip(source) {
                *out = table[byte as usize];
            }
        }
        WriteOp::Add => {
            for (out, &byte) in target.iter_mut().zip(source) {
                *out ^= table[byte as usize];
            }
        }
    }
}

const BATCH: usize = 32;

/// 32-byte batches, 8 lookups per step, scalar tail
fn mul_slice_unrolled(table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8], op: WriteOp) {
    debug_assert_eq!(source.len(), target.len());
    let mut src_batches = source.chunks_exact(BATCH);
    let mut dst_batches = target.chunks_exact_mut(BATCH);

    for (src, dst) in (&mut src_batches).zip(&mut dst_batches) {
        for (s, d) in src.chunks_exact(8).zip(dst.chunks_exact_mut(8)) {
            let p0 = table[s[0] as usize];
            let p1 = table[s[1] as usize];
            let p2 = table[s[2] as usize];
            let p3 = table[s[3] as usize];
            let p4 = table[s[4] as usize];
            let p5 = table[s[5] as usize];
            let p6 = table[s[6] as usize];
            let p7 = table[s[7] as usize];

            match op {
                WriteOp::Direct => {
                    d[0] = p0;
                    d[1] = p1;
                    d[2] = p2;
                    d[3] = p3;
                    d[4] = p4;
                    d[5] = p5;
                    d[6] = p6;
                    d[7] = p7;
                }
                WriteOp::Add => {
                    d[0] ^= p0;
                    d[1] ^= p1;
                    d[2] ^= p2;
                    d[3] ^= p3;
                    d[4] ^= p4;
                    d[5] ^= p5;
                    d[6] ^= p6;
                    d[7] ^= p7;
                }
            }
        }
    }

    mul_slice_scalar(
        table,
        src_batches.remainder(),
        dst_batches.into_remainder(),
        op,
    );
}

/// Byte-at-a-time reference implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarCodec;

impl RegionCodec for ScalarCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Scalar
    }

    fn apply_set(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8]) {
        mul_slice_scalar(table, source, target, WriteOp::Direct);
    }

    fn apply_xor(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8]) {
        mul_slice_scalar(table, source, target, WriteOp::Add);
    }
}

/// Portable batched implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct UnrolledCodec;

impl RegionCodec for UnrolledCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Unrolled
    }

    fn apply_set(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8]) {
        mul_slice_unrolled(table, source, target, WriteOp::Direct);
    }

    fn apply_xor(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8]) {
        mul_slice_unrolled(table, source, target, WriteOp::Add);
    }
}

static SCALAR: ScalarCodec = ScalarCodec;
static UNROLLED: UnrolledCodec = UnrolledCodec;

/// Resolve a codec kind to a shared instance
///
/// Fails with [`RsError::InvalidArgument`] when the CPU lacks the
/// instructions `kind` needs.
pub fn codec_for(kind: CodecKind) -> RsResult<&'static dyn RegionCodec> {
    match kind {
        CodecKind::Scalar => Ok(&SCALAR),
        CodecKind::Unrolled => Ok(&UNROLLED),
        CodecKind::Ssse3 => match simd::ssse3_codec() {
            Some(codec) => Ok(codec),
            None => Err(RsError::InvalidArgument {
                name: "codec",
                value: kind as u64,
            }),
        },
    }
}

/// Every codec usable on this CPU
pub fn available_codecs() -> Vec<CodecKind> {
    [CodecKind::Scalar, CodecKind::Unrolled, CodecKind::Ssse3]
        .into_iter()
        .filter(|&kind| codec_for(kind).is_ok())
        .collect()
}
