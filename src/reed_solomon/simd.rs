//! SIMD region codec and CPU feature detection
//!
//! ## PSHUFB Technique
//!
//! PSHUFB performs sixteen parallel 4-bit lookups. A 256-entry multiplication
//! table row is split into two 16-entry nibble tables:
//!
//! - `low[n]  = c * n`
//! - `high[n] = c * (n << 4)`
//!
//! Since multiplication distributes over XOR,
//! `c * x = low[x & 0x0F] ^ high[x >> 4]`, which processes 16 bytes per
//! shuffle pair.

use super::codec::{CodecKind, RegionCodec, WriteOp};
use super::galois::FIELD_SIZE;
use std::sync::OnceLock;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Runtime detection of the fastest codec, cached after the first call
pub fn detect_codec() -> CodecKind {
    static DETECTED: OnceLock<CodecKind> = OnceLock::new();
    *DETECTED.get_or_init(|| {
        let kind = if ssse3_supported() {
            CodecKind::Ssse3
        } else {
            CodecKind::Unrolled
        };
        log::debug!("Detected region codec: {}", kind);
        kind
    })
}

#[cfg(target_arch = "x86_64")]
fn ssse3_supported() -> bool {
    is_x86_feature_detected!("ssse3")
}

#[cfg(not(target_arch = "x86_64"))]
fn ssse3_supported() -> bool {
    false
}

/// Split a multiplication table row into low/high nibble tables
pub(crate) fn nibble_tables(table: &[u8; FIELD_SIZE]) -> ([u8; 16], [u8; 16]) {
    let mut low = [0u8; 16];
    let mut high = [0u8; 16];
    for n in 0..16 {
        low[n] = table[n];
        high[n] = table[n << 4];
    }
    (low, high)
}

/// SSSE3 nibble-shuffle codec
///
/// Only obtainable through [`ssse3_codec`], so holding one proves the CPU
/// supports SSSE3.
#[derive(Debug)]
pub struct Ssse3Codec {
    _verified: (),
}

static SSSE3: Ssse3Codec = Ssse3Codec { _verified: () };

/// The SSSE3 codec, if this CPU supports it
pub fn ssse3_codec() -> Option<&'static Ssse3Codec> {
    if ssse3_supported() {
        Some(&SSSE3)
    } else {
        None
    }
}

impl Ssse3Codec {
    #[cfg(target_arch = "x86_64")]
    fn mul_slice(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8], op: WriteOp) {
        // SAFETY: an Ssse3Codec only exists after SSSE3 was detected
        unsafe { mul_slice_ssse3(table, source, target, op) }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn mul_slice(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8], op: WriteOp) {
        super::codec::mul_slice_scalar(table, source, target, op)
    }
}

impl RegionCodec for Ssse3Codec {
    fn kind(&self) -> CodecKind {
        CodecKind::Ssse3
    }

    fn apply_set(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8]) {
        self.mul_slice(table, source, target, WriteOp::Direct);
    }

    fn apply_xor(&self, table: &[u8; FIELD_SIZE], source: &[u8], target: &mut [u8]) {
        self.mul_slice(table, source, target, WriteOp::Add);
    }
}

/// SSSE3 multiply of 16 bytes per iteration with a scalar tail
///
/// # Safety
/// - Requires SSSE3 CPU support. Caller must ensure the CPU supports SSSE3 before calling.
/// - Processes `min(source.len(), target.len())` bytes; all loads and stores stay inside both slices.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3")]
unsafe fn mul_slice_ssse3(
    table: &[u8; FIELD_SIZE],
    source: &[u8],
    target: &mut [u8],
    op: WriteOp,
) {
    let len = source.len().min(target.len());
    let (low, high) = nibble_tables(table);

    let low_v = _mm_loadu_si128(low.as_ptr() as *const __m128i);
    let high_v = _mm_loadu_si128(high.as_ptr() as *const __m128i);
    let mask = _mm_set1_epi8(0x0F);

    let simd_len = len - len % 16;
    let src_ptr = source.as_ptr();
    let dst_ptr = target.as_mut_ptr();
    let mut i = 0;

    while i < simd_len {
        let s = _mm_loadu_si128(src_ptr.add(i) as *const __m128i);
        let lo = _mm_shuffle_epi8(low_v, _mm_and_si128(s, mask));
        let hi = _mm_shuffle_epi8(high_v, _mm_and_si128(_mm_srli_epi64::<4>(s), mask));
        let mut product = _mm_xor_si128(lo, hi);

        if op == WriteOp::Add {
            let d = _mm_loadu_si128(dst_ptr.add(i) as *const __m128i);
            product = _mm_xor_si128(product, d);
        }

        _mm_storeu_si128(dst_ptr.add(i) as *mut __m128i, product);
        i += 16;
    }

    super::codec::mul_slice_scalar(
        table,
        &source[simd_len..len],
        &mut target[simd_len..len],
        op,
    );
}
