//! Reed-Solomon erasure coding over GF(2^8)
//!
//! Given K data shards the engine computes M parity shards such that any K of
//! the K+M shards reconstruct the rest.
//!
//! Layering, leaves first: [`galois`] field arithmetic, [`matrix`] algebra,
//! [`coding`] matrix construction, region codecs in [`codec`] and [`simd`],
//! and the [`ReedSolomon`] engine.

pub mod builder;
pub mod codec;
pub mod coding;
pub mod error;
pub mod galois;
pub mod matrix;
pub mod reedsolomon;
pub mod shards;
pub mod simd;

pub use builder::{CodecChoice, ReedSolomonBuilder, ShardLimit};
pub use codec::{
    available_codecs, codec_for, CodecKind, RegionCodec, ScalarCodec, UnrolledCodec, WriteOp,
};
pub use coding::{build_matrix, vandermonde};
pub use error::{ErrorKind, RsError, RsResult};
pub use galois::{
    add, divide, exp, generate_exp_table, generate_log_table, multiply, subtract, Galois8,
    MulTable, EXP_TABLE, FIELD_SIZE, GENERATING_POLYNOMIAL, LOG_TABLE,
};
pub use matrix::Matrix;
pub use reedsolomon::ReedSolomon;
pub use shards::{BufferLayout, ShardMask, ShardRegion, ShardSelection, MASK31_MAX};
pub use simd::{detect_codec, ssse3_codec, Ssse3Codec};
