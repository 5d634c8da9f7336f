//! Reed-Solomon erasure coding engine
//!
//! ## Overview
//!
//! An engine is built once per (data, parity) configuration. It owns the
//! systematic coding matrix and a copy of its parity rows, and borrows the
//! process-wide multiplication table and a region codec.
//!
//! ## Calling Conventions
//!
//! - **Shard arrays**: `&mut [S]` where every `S` is one shard buffer
//! - **Byte buffers**: one `&mut [u8]` holding all shards back to back,
//!   described by a [`BufferLayout`]
//!
//! Both are turned into a list of shard views plus a [`ShardRegion`] and
//! handed to the same coding routines.
//!
//! ## Failure Semantics
//!
//! Every argument, capacity and matrix check runs before the first byte is
//! written, so a call that returns an error has not touched any shard.

use super::builder::{ReedSolomonBuilder, ShardLimit};
use super::codec::{CodecKind, RegionCodec};
use super::coding::build_matrix;
use super::error::{check_u32, RsError, RsResult};
use super::galois::MulTable;
use super::matrix::Matrix;
use super::shards::{split_pair, BufferLayout, ShardMask, ShardRegion, ShardSelection};
use log::{debug, trace};
use smallvec::SmallVec;
use std::fmt;
use std::ops::Range;

/// Per-call coefficient rows, one per target
type RowBuffer = SmallVec<[u8; 1024]>;

/// Shard indices taking part in one coding pass
type IndexList = SmallVec<[usize; 32]>;

/// Reed-Solomon encoder/decoder over GF(2^8)
pub struct ReedSolomon {
    data_shards: usize,
    parity_shards: usize,
    matrix: Matrix,
    /// `parity_shards × data_shards`, row-major
    parity_rows: Vec<u8>,
    tables: &'static MulTable,
    codec: &'static dyn RegionCodec,
    limit: ShardLimit,
}

impl fmt::Debug for ReedSolomon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReedSolomon")
            .field("data_shards", &self.data_shards)
            .field("parity_shards", &self.parity_shards)
            .field("codec", &self.codec.kind())
            .field("limit", &self.limit)
            .finish()
    }
}

impl ReedSolomon {
    /// Engine with the auto-detected codec and the 256-shard limit
    pub fn new(data_shards: usize, parity_shards: usize) -> RsResult<Self> {
        ReedSolomonBuilder::new()
            .data_shards(data_shards)
            .parity_shards(parity_shards)
            .build()
    }

    pub fn builder() -> ReedSolomonBuilder {
        ReedSolomonBuilder::new()
    }

    /// Called by the builder once counts are validated
    pub(crate) fn with_codec(
        data_shards: usize,
        parity_shards: usize,
        codec: &'static dyn RegionCodec,
        limit: ShardLimit,
    ) -> RsResult<Self> {
        let total_shards = data_shards + parity_shards;
        let matrix = build_matrix(data_shards, total_shards)?;

        let mut parity_rows = Vec::with_capacity(parity_shards * data_shards);
        for row in data_shards..total_shards {
            parity_rows.extend(matrix.row(row)?.iter().map(|e| e.value()));
        }

        debug!(
            "Created Reed-Solomon engine: {} data + {} parity shards, codec {}",
            data_shards,
            parity_shards,
            codec.kind()
        );

        Ok(ReedSolomon {
            data_shards,
            parity_shards,
            matrix,
            parity_rows,
            tables: MulTable::global(),
            codec,
            limit,
        })
    }

    pub fn data_shard_count(&self) -> usize {
        self.data_shards
    }

    pub fn parity_shard_count(&self) -> usize {
        self.parity_shards
    }

    pub fn total_shard_count(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    pub fn codec_kind(&self) -> CodecKind {
        self.codec.kind()
    }

    pub fn shard_limit(&self) -> ShardLimit {
        self.limit
    }

    /// The full `total × data` coding matrix
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Coefficients of parity shard `index`, one per data shard
    pub fn parity_row(&self, index: usize) -> Option<&[u8]> {
        if index >= self.parity_shards {
            return None;
        }
        let width = self.data_shards;
        Some(&self.parity_rows[index * width..(index + 1) * width])
    }

    /// All parity rows, `parity × data` row-major
    pub fn parity_rows(&self) -> &[u8] {
        &self.parity_rows
    }

    // ========================================================================
    // Shard-array API
    // ========================================================================

    /// Compute every parity shard from the data shards over `offset..offset + size`
    pub fn encode<S>(&self, shards: &mut [S], offset: usize, size: usize) -> RsResult<()>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        let region = self.check_shards(shards, offset, size)?;
        let mut views: SmallVec<[&mut [u8]; 32]> =
            shards.iter_mut().map(|s| s.as_mut()).collect();
        self.encode_views(&mut views, &region);
        Ok(())
    }

    /// Rebuild every shard whose `present` flag is false
    ///
    /// Returns immediately when nothing is missing. Fails with
    /// [`RsError::InsufficientShards`] when fewer than `data_shards` are present.
    pub fn decode<S>(
        &self,
        shards: &mut [S],
        offset: usize,
        size: usize,
        present: &[bool],
    ) -> RsResult<()>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        let region = self.check_shards(shards, offset, size)?;
        if present.len() != self.total_shard_count() {
            return Err(RsError::ShardCountMismatch {
                expected: self.total_shard_count(),
                actual: present.len(),
            });
        }

        let present_count = present.iter().filter(|&&p| p).count();
        if present_count < self.data_shards {
            return Err(RsError::InsufficientShards {
                needed: self.data_shards,
                present: present_count,
            });
        }

        let selection = ShardSelection::from_present(present)?;
        let mut views: SmallVec<[&mut [u8]; 32]> =
            shards.iter_mut().map(|s| s.as_mut()).collect();
        self.decode_views(&mut views, &region, &selection)
    }

    /// Rebuild `selection.targets` from `selection.sources`
    ///
    /// Shards in neither set are left unspecified.
    pub fn decode_selection<S>(
        &self,
        shards: &mut [S],
        offset: usize,
        size: usize,
        selection: &ShardSelection,
    ) -> RsResult<()>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        let region = self.check_shards(shards, offset, size)?;
        let mut views: SmallVec<[&mut [u8]; 32]> =
            shards.iter_mut().map(|s| s.as_mut()).collect();
        self.decode_views(&mut views, &region, selection)
    }

    /// Recompute parity into `scratch` and compare with the stored parity shards
    ///
    /// `scratch` must be at least one shard long. No shard is modified.
    pub fn is_parity_correct<S>(
        &self,
        shards: &[S],
        offset: usize,
        size: usize,
        scratch: &mut [u8],
    ) -> RsResult<bool>
    where
        S: AsRef<[u8]>,
    {
        let region = self.check_shards(shards, offset, size)?;
        let views: SmallVec<[&[u8]; 32]> = shards.iter().map(|s| s.as_ref()).collect();
        self.parity_matches(&views, &region, scratch)
    }

    // ========================================================================
    // Byte-buffer API
    // ========================================================================

    /// Encode shards packed in one buffer
    pub fn encode_buffer(&self, buffer: &mut [u8], layout: BufferLayout) -> RsResult<()> {
        let region = layout.region(buffer.len(), self.total_shard_count())?;
        let mut views = buffer_views(&mut buffer[layout.span()], &region);
        self.encode_views(&mut views, &region);
        Ok(())
    }

    /// Rebuild the shards in `targets`; every other shard is treated as a source
    pub fn decode_buffer(
        &self,
        buffer: &mut [u8],
        layout: BufferLayout,
        targets: ShardMask,
    ) -> RsResult<()> {
        let region = layout.region(buffer.len(), self.total_shard_count())?;
        if let Some(index) = targets.highest() {
            if index >= self.total_shard_count() {
                return Err(RsError::ShardOutOfRange {
                    index,
                    total: self.total_shard_count(),
                });
            }
        }
        let selection = ShardSelection::from_targets(targets, self.total_shard_count())?;
        let mut views = buffer_views(&mut buffer[layout.span()], &region);
        self.decode_views(&mut views, &region, &selection)
    }

    /// Parity check over shards packed in one buffer
    pub fn is_parity_correct_buffer(
        &self,
        buffer: &[u8],
        layout: BufferLayout,
        scratch: &mut [u8],
    ) -> RsResult<bool> {
        let region = layout.region(buffer.len(), self.total_shard_count())?;
        let packed = &buffer[layout.span()];
        let views: SmallVec<[&[u8]; 32]> = if region.shard_length == 0 {
            (0..region.count).map(|_| &packed[..0]).collect()
        } else {
            packed.chunks_exact(region.shard_length).collect()
        };
        self.parity_matches(&views, &region, scratch)
    }

    // ========================================================================
    // Coding core
    // ========================================================================

    /// Shard count, equal lengths and byte range
    fn check_shards<S: AsRef<[u8]>>(
        &self,
        shards: &[S],
        offset: usize,
        size: usize,
    ) -> RsResult<ShardRegion> {
        check_u32("offset", offset)?;
        check_u32("size", size)?;

        if shards.len() != self.total_shard_count() {
            return Err(RsError::ShardCountMismatch {
                expected: self.total_shard_count(),
                actual: shards.len(),
            });
        }

        let shard_length = shards[0].as_ref().len();
        for (index, shard) in shards.iter().enumerate().skip(1) {
            let actual = shard.as_ref().len();
            if actual != shard_length {
                return Err(RsError::ShardLengthMismatch {
                    index,
                    expected: shard_length,
                    actual,
                });
            }
        }

        ShardRegion::new(shards.len(), shard_length, offset, size)
    }

    fn encode_views(&self, views: &mut [&mut [u8]], region: &ShardRegion) {
        let sources: IndexList = (0..self.data_shards).collect();
        let targets: IndexList = (self.data_shards..self.total_shard_count()).collect();
        self.code_some_shards(
            views,
            region.range.clone(),
            &self.parity_rows,
            &sources,
            &targets,
        );
    }

    /// Two-phase decode: missing data shards first, then missing parity
    fn decode_views(
        &self,
        views: &mut [&mut [u8]],
        region: &ShardRegion,
        selection: &ShardSelection,
    ) -> RsResult<()> {
        let total = self.total_shard_count();
        selection.validate(total)?;

        let targets = selection.targets;
        if targets.count() > self.parity_shards {
            return Err(RsError::TooManyTargets {
                targets: targets.count(),
                parity: self.parity_shards,
            });
        }
        if targets.is_empty() {
            return Ok(());
        }

        let data_targets: IndexList = targets
            .iter()
            .take_while(|&i| i < self.data_shards)
            .collect();
        let parity_targets: IndexList = targets
            .iter()
            .filter(|&i| i >= self.data_shards)
            .collect();

        // Phase 2 reads every data shard, so voided data shards are rebuilt too
        let data_to_recover: IndexList = if parity_targets.is_empty() {
            data_targets
        } else {
            (0..self.data_shards)
                .filter(|&i| !selection.sources.contains(i))
                .collect()
        };

        // Everything that can fail happens before the first write
        let recovery = if data_to_recover.is_empty() {
            None
        } else {
            Some(self.data_recovery_rows(&selection.sources, &data_to_recover)?)
        };

        if let Some((rows, sources)) = recovery {
            debug!(
                "Recovering {} data shards from {} sources",
                data_to_recover.len(),
                sources.len()
            );
            self.code_some_shards(
                views,
                region.range.clone(),
                &rows,
                &sources,
                &data_to_recover,
            );
        }

        if !parity_targets.is_empty() {
            debug!("Recomputing {} parity shards", parity_targets.len());
            let mut rows = RowBuffer::with_capacity(parity_targets.len() * self.data_shards);
            for &target in &parity_targets {
                let p = target - self.data_shards;
                rows.extend_from_slice(
                    &self.parity_rows[p * self.data_shards..(p + 1) * self.data_shards],
                );
            }
            let sources: IndexList = (0..self.data_shards).collect();
            self.code_some_shards(views, region.range.clone(), &rows, &sources, &parity_targets);
        }

        Ok(())
    }

    /// Invert the submatrix of the first `data_shards` sources and pick the
    /// rows that regenerate `missing`
    fn data_recovery_rows(
        &self,
        sources: &ShardMask,
        missing: &[usize],
    ) -> RsResult<(RowBuffer, IndexList)> {
        let chosen: IndexList = sources.iter().take(self.data_shards).collect();
        if chosen.len() < self.data_shards {
            return Err(RsError::InsufficientShards {
                needed: self.data_shards,
                present: chosen.len(),
            });
        }

        let mut sub_matrix = Matrix::new(self.data_shards, self.data_shards);
        for (r, &shard) in chosen.iter().enumerate() {
            for c in 0..self.data_shards {
                sub_matrix.set(r, c, self.matrix.get(shard, c)?)?;
            }
        }
        let data_matrix = sub_matrix.invert()?;

        let mut rows = RowBuffer::with_capacity(missing.len() * self.data_shards);
        for &shard in missing {
            rows.extend(data_matrix.row(shard)?.iter().map(|e| e.value()));
        }
        Ok((rows, chosen))
    }

    /// For each target: set from the first source, xor in the rest
    ///
    /// `rows` holds `targets.len()` rows of `sources.len()` coefficients.
    fn code_some_shards(
        &self,
        views: &mut [&mut [u8]],
        range: Range<usize>,
        rows: &[u8],
        sources: &[usize],
        targets: &[usize],
    ) {
        let width = sources.len();
        debug_assert_eq!(rows.len(), width * targets.len());

        for (row, &target) in rows.chunks_exact(width).zip(targets) {
            trace!("Coding shard {} from {} sources", target, width);
            for (i, (&source, &coefficient)) in sources.iter().zip(row).enumerate() {
                let table = self.tables.row(coefficient);
                let (input, output) = split_pair(views, source, target);
                let input = &input[range.clone()];
                let output = &mut output[range.clone()];
                if i == 0 {
                    self.codec.apply_set(table, input, output);
                } else {
                    self.codec.apply_xor(table, input, output);
                }
            }
        }
    }

    fn parity_matches(
        &self,
        views: &[&[u8]],
        region: &ShardRegion,
        scratch: &mut [u8],
    ) -> RsResult<bool> {
        if scratch.len() < region.shard_length {
            return Err(RsError::ScratchTooSmall {
                needed: region.shard_length,
                actual: scratch.len(),
            });
        }

        let range = region.range.clone();
        let scratch = &mut scratch[range.clone()];
        for (p, row) in self.parity_rows.chunks_exact(self.data_shards).enumerate() {
            for (source, &coefficient) in row.iter().enumerate() {
                let table = self.tables.row(coefficient);
                let input = &views[source][range.clone()];
                if source == 0 {
                    self.codec.apply_set(table, input, scratch);
                } else {
                    self.codec.apply_xor(table, input, scratch);
                }
            }
            if views[self.data_shards + p][range.clone()] != *scratch {
                trace!("Parity shard {} does not match", self.data_shards + p);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Split a packed shard buffer into one view per shard
fn buffer_views<'a>(packed: &'a mut [u8], region: &ShardRegion) -> SmallVec<[&'a mut [u8]; 32]> {
    if region.shard_length == 0 {
        return (0..region.count).map(|_| <&mut [u8]>::default()).collect();
    }
    packed.chunks_exact_mut(region.shard_length).collect()
}
