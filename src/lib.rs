//! Reed-Solomon erasure coding over GF(256)
//!
//! The [`reed_solomon`] module holds the coding engine. [`args`] and
//! [`harness`] drive the `rs256` benchmark binary.

pub mod args;
pub mod harness;
pub mod reed_solomon;

pub use args::parse_args;
pub use reed_solomon::{
    BufferLayout, CodecChoice, CodecKind, ReedSolomon, ReedSolomonBuilder, RsError, RsResult,
    ShardLimit, ShardMask, ShardSelection,
};
