//! Shard addressing: index masks, source/target selections and region descriptors
//!
//! Both calling conventions (an array of shard buffers, or one contiguous
//! buffer of equal-length shards) reduce to a [`ShardRegion`] plus a
//! [`ShardSelection`] before any coding happens.

use super::error::{check_u32, RsError, RsResult};
use super::galois::FIELD_SIZE;
use std::fmt;
use std::ops::Range;

/// Largest value accepted by [`ShardMask::from_bits`]
pub const MASK31_MAX: u32 = 0x7FFF_FFFF;

/// Fixed-width set of shard indices
///
/// 256 bits wide, one per addressable shard in GF(2^8).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShardMask([u64; 4]);

impl ShardMask {
    /// Number of addressable shard indices
    pub const CAPACITY: usize = FIELD_SIZE;

    pub const fn empty() -> Self {
        ShardMask([0; 4])
    }

    /// Mask with every index in `range` set
    pub fn range(range: Range<usize>) -> RsResult<Self> {
        let mut mask = Self::empty();
        for index in range {
            mask.insert(index)?;
        }
        Ok(mask)
    }

    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> RsResult<Self> {
        let mut mask = Self::empty();
        for index in indices {
            mask.insert(index)?;
        }
        Ok(mask)
    }

    /// Mask from a 31-bit integer, bit `i` selecting shard `i`
    pub fn from_bits(bits: u32) -> RsResult<Self> {
        if bits > MASK31_MAX {
            return Err(RsError::InvalidArgument {
                name: "mask",
                value: u64::from(bits),
            });
        }
        Ok(ShardMask([u64::from(bits), 0, 0, 0]))
    }

    pub fn insert(&mut self, index: usize) -> RsResult<()> {
        if index >= Self::CAPACITY {
            return Err(RsError::ShardOutOfRange {
                index,
                total: Self::CAPACITY,
            });
        }
        self.0[index / 64] |= 1u64 << (index % 64);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) {
        if index < Self::CAPACITY {
            self.0[index / 64] &= !(1u64 << (index % 64));
        }
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < Self::CAPACITY && self.0[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Population count
    pub fn count(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Index of the most significant set bit
    pub fn highest(&self) -> Option<usize> {
        for (i, word) in self.0.iter().enumerate().rev() {
            if *word != 0 {
                return Some(i * 64 + 63 - word.leading_zeros() as usize);
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    pub fn intersect(&self, other: &ShardMask) -> ShardMask {
        let mut words = self.0;
        for (w, o) in words.iter_mut().zip(other.0) {
            *w &= o;
        }
        ShardMask(words)
    }

    pub fn union(&self, other: &ShardMask) -> ShardMask {
        let mut words = self.0;
        for (w, o) in words.iter_mut().zip(other.0) {
            *w |= o;
        }
        ShardMask(words)
    }

    /// Indices in `self` but not in `other`
    pub fn difference(&self, other: &ShardMask) -> ShardMask {
        let mut words = self.0;
        for (w, o) in words.iter_mut().zip(other.0) {
            *w &= !o;
        }
        ShardMask(words)
    }

    /// Set indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..Self::CAPACITY).filter(move |&i| self.contains(i))
    }
}

impl fmt::Debug for ShardMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Which shards are valid inputs and which are to be computed
///
/// Shards in neither set are "voided": their contents are unspecified after
/// a decode and callers must not rely on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShardSelection {
    pub sources: ShardMask,
    pub targets: ShardMask,
}

impl ShardSelection {
    pub fn new(sources: ShardMask, targets: ShardMask) -> Self {
        ShardSelection { sources, targets }
    }

    /// Present shards become sources, absent shards become targets
    pub fn from_present(present: &[bool]) -> RsResult<Self> {
        let mut selection = ShardSelection::default();
        for (index, &is_present) in present.iter().enumerate() {
            if is_present {
                selection.sources.insert(index)?;
            } else {
                selection.targets.insert(index)?;
            }
        }
        Ok(selection)
    }

    /// Every shard outside `targets` is a source
    pub fn from_targets(targets: ShardMask, total_shards: usize) -> RsResult<Self> {
        let all = ShardMask::range(0..total_shards)?;
        Ok(ShardSelection {
            sources: all.difference(&targets),
            targets,
        })
    }

    /// Check indices against `total_shards` and that no shard is both source and target
    pub fn validate(&self, total_shards: usize) -> RsResult<()> {
        let selected = self.sources.union(&self.targets);
        if let Some(index) = selected.highest() {
            if index >= total_shards {
                return Err(RsError::ShardOutOfRange {
                    index,
                    total: total_shards,
                });
            }
        }
        if let Some(index) = self.sources.intersect(&self.targets).iter().next() {
            return Err(RsError::SourcesAreTargets { index });
        }
        Ok(())
    }
}

/// Shape of a shard set and the active byte range inside every shard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardRegion {
    pub count: usize,
    pub shard_length: usize,
    pub range: Range<usize>,
}

impl ShardRegion {
    pub fn new(count: usize, shard_length: usize, offset: usize, size: usize) -> RsResult<Self> {
        check_u32("shardLength", shard_length)?;
        let end = checked_end(offset, size, shard_length)?;
        Ok(ShardRegion {
            count,
            shard_length,
            range: offset..end,
        })
    }

    /// Byte range as (offset, size)
    pub fn offset_size(&self) -> (usize, usize) {
        (self.range.start, self.range.end - self.range.start)
    }
}

/// `offset + size`, provided it does not pass `length`
fn checked_end(offset: usize, size: usize, length: usize) -> RsResult<usize> {
    match offset.checked_add(size) {
        Some(end) if end <= length => Ok(end),
        _ => Err(RsError::InvalidRange {
            offset,
            size,
            length,
        }),
    }
}

/// Placement of `total_shards` equal-length shards inside one contiguous buffer
///
/// Shard `i` occupies
/// `buffer[buffer_offset + i * shard_length..buffer_offset + (i + 1) * shard_length]`
/// and coding touches `shard_offset..shard_offset + shard_size` within each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferLayout {
    pub buffer_offset: usize,
    pub buffer_size: usize,
    pub shard_length: usize,
    pub shard_offset: usize,
    pub shard_size: usize,
}

impl BufferLayout {
    /// Layout covering whole shards packed from the start of the buffer
    pub fn whole(shard_length: usize, total_shards: usize) -> Self {
        BufferLayout {
            buffer_offset: 0,
            buffer_size: shard_length * total_shards,
            shard_length,
            shard_offset: 0,
            shard_size: shard_length,
        }
    }

    /// Validate against a buffer of `buffer_len` bytes holding `total_shards` shards
    pub fn region(&self, buffer_len: usize, total_shards: usize) -> RsResult<ShardRegion> {
        check_u32("bufferOffset", self.buffer_offset)?;
        check_u32("bufferSize", self.buffer_size)?;
        check_u32("shardLength", self.shard_length)?;
        check_u32("shardOffset", self.shard_offset)?;
        check_u32("shardSize", self.shard_size)?;

        checked_end(self.buffer_offset, self.buffer_size, buffer_len)?;

        if self.shard_length.checked_mul(total_shards) != Some(self.buffer_size) {
            return Err(RsError::ShardLengthMismatch {
                index: 0,
                expected: self.buffer_size / total_shards.max(1),
                actual: self.shard_length,
            });
        }

        ShardRegion::new(
            total_shards,
            self.shard_length,
            self.shard_offset,
            self.shard_size,
        )
    }

    /// Byte range of the shards inside the full buffer
    pub fn span(&self) -> Range<usize> {
        self.buffer_offset..self.buffer_offset + self.buffer_size
    }
}

/// Borrow one shard immutably and a different one mutably
#[inline]
pub(crate) fn split_pair<'a>(
    shards: &'a mut [&mut [u8]],
    source: usize,
    target: usize,
) -> (&'a [u8], &'a mut [u8]) {
    debug_assert_ne!(source, target);
    if source < target {
        let (lo, hi) = shards.split_at_mut(target);
        (&*lo[source], &mut *hi[0])
    } else {
        let (lo, hi) = shards.split_at_mut(source);
        (&*hi[0], &mut *lo[target])
    }
}
