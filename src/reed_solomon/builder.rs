//! Engine configuration
//!
//! ```
//! use rs256::reed_solomon::{CodecChoice, ReedSolomonBuilder, ShardLimit};
//!
//! let rs = ReedSolomonBuilder::new()
//!     .data_shards(10)
//!     .parity_shards(4)
//!     .codec(CodecChoice::Scalar)
//!     .shard_limit(ShardLimit::Mask31)
//!     .build()
//!     .unwrap();
//! assert_eq!(rs.total_shard_count(), 14);
//! ```

use super::codec::{codec_for, CodecKind, RegionCodec};
use super::error::{check_u32, RsError, RsResult};
use super::galois::FIELD_SIZE;
use super::reedsolomon::ReedSolomon;
use super::simd::detect_codec;

/// Which region codec an engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecChoice {
    /// Fastest codec this CPU supports, detected once per process
    #[default]
    Auto,
    Scalar,
    Unrolled,
    Ssse3,
}

impl CodecChoice {
    pub fn resolve(self) -> RsResult<&'static dyn RegionCodec> {
        let kind = match self {
            CodecChoice::Auto => detect_codec(),
            CodecChoice::Scalar => CodecKind::Scalar,
            CodecChoice::Unrolled => CodecKind::Unrolled,
            CodecChoice::Ssse3 => CodecKind::Ssse3,
        };
        codec_for(kind)
    }
}

impl std::str::FromStr for CodecChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(CodecChoice::Auto),
            "scalar" => Ok(CodecChoice::Scalar),
            "unrolled" => Ok(CodecChoice::Unrolled),
            "ssse3" => Ok(CodecChoice::Ssse3),
            other => Err(format!("unknown codec: {other}")),
        }
    }
}

/// Upper bound on data + parity shards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShardLimit {
    /// Every row of a GF(2^8) Vandermonde matrix: 256 shards
    #[default]
    Field,
    /// Shards addressable by a 31-bit integer mask
    Mask31,
}

impl ShardLimit {
    pub fn max_total(self) -> usize {
        match self {
            ShardLimit::Field => FIELD_SIZE,
            ShardLimit::Mask31 => 31,
        }
    }
}

/// Builder for [`ReedSolomon`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReedSolomonBuilder {
    data_shards: usize,
    parity_shards: usize,
    codec: CodecChoice,
    limit: ShardLimit,
}

impl ReedSolomonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_shards(mut self, count: usize) -> Self {
        self.data_shards = count;
        self
    }

    pub fn parity_shards(mut self, count: usize) -> Self {
        self.parity_shards = count;
        self
    }

    pub fn codec(mut self, codec: CodecChoice) -> Self {
        self.codec = codec;
        self
    }

    pub fn shard_limit(mut self, limit: ShardLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Validate the configuration and build the coding matrix
    pub fn build(self) -> RsResult<ReedSolomon> {
        check_u32("dataShards", self.data_shards)?;
        check_u32("parityShards", self.parity_shards)?;

        let total = self.data_shards.saturating_add(self.parity_shards);
        if self.data_shards == 0 || self.parity_shards == 0 || total > self.limit.max_total() {
            return Err(RsError::InvalidShardCount {
                data: self.data_shards,
                parity: self.parity_shards,
                limit: self.limit.max_total(),
            });
        }

        let codec = self.codec.resolve()?;
        ReedSolomon::with_codec(self.data_shards, self.parity_shards, codec, self.limit)
    }
}
