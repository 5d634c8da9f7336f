//! Encode/decode benchmark with CRC32 verification
//!
//! Each case builds an engine for one (data, parity, shard size) triple, times
//! repeated encodes of a packed buffer, then erases up to `parity` random
//! shards, decodes them and checks every shard against its pre-erasure CRC32.
//! Cases are independent and run data-parallel on a rayon pool.

use crate::reed_solomon::{BufferLayout, CodecChoice, ReedSolomon, RsResult, ShardMask};
use anyhow::{bail, Context, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Configuration for a benchmark run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Cases cover 1..=max_data data shards
    pub max_data: usize,
    /// Cases cover 1..=max_parity parity shards
    pub max_parity: usize,
    pub shard_sizes: Vec<usize>,
    /// Encode calls timed per case
    pub samples: usize,
    pub codec: CodecChoice,
    pub seed: u64,
    /// Number of threads for computation (0 = auto-detect)
    pub threads: usize,
    /// Whether cases run in parallel (false = one at a time)
    pub parallel: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_data: 20,
            max_parity: 4,
            shard_sizes: vec![4096, 65536, 262144],
            samples: 40,
            codec: CodecChoice::Auto,
            seed: 0,
            threads: 0,
            parallel: true,
        }
    }
}

fn parse_number<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    matches
        .get_one::<String>(name)
        .map(|s| s.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("invalid value for --{name}"))
}

impl HarnessConfig {
    pub fn from_args(matches: &clap::ArgMatches) -> Result<Self> {
        let defaults = Self::default();

        let shard_sizes = match matches.get_one::<String>("shard_sizes") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().parse::<usize>())
                .collect::<Result<Vec<_>, _>>()
                .context("invalid value for --shard-sizes")?,
            None => defaults.shard_sizes,
        };
        if shard_sizes.is_empty() || shard_sizes.contains(&0) {
            bail!("shard sizes must be positive");
        }

        let codec = match matches.get_one::<String>("codec") {
            Some(name) => name.parse::<CodecChoice>().map_err(anyhow::Error::msg)?,
            None => defaults.codec,
        };

        Ok(Self {
            max_data: parse_number(matches, "data")?.unwrap_or(defaults.max_data),
            max_parity: parse_number(matches, "parity")?.unwrap_or(defaults.max_parity),
            shard_sizes,
            samples: parse_number(matches, "samples")?.unwrap_or(defaults.samples),
            codec,
            seed: parse_number(matches, "seed")?.unwrap_or(defaults.seed),
            threads: parse_number(matches, "threads")?.unwrap_or(defaults.threads),
            parallel: !matches.get_flag("no-parallel"),
        })
    }

    /// Get effective thread count (auto-detect if 0)
    pub fn effective_threads(&self) -> usize {
        match (self.parallel, self.threads) {
            (false, _) => 1,
            (true, 0) => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            (true, n) => n,
        }
    }

    /// Every (data, parity, shard size) combination, data-major
    pub fn cases(&self) -> Vec<BenchCase> {
        let mut cases = Vec::new();
        for data in 1..=self.max_data {
            for parity in 1..=self.max_parity {
                for &shard_size in &self.shard_sizes {
                    cases.push(BenchCase {
                        data,
                        parity,
                        shard_size,
                    });
                }
            }
        }
        cases
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchCase {
    pub data: usize,
    pub parity: usize,
    pub shard_size: usize,
}

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub case: BenchCase,
    /// Mean time per encode call
    pub latency: Duration,
    /// Data bytes encoded per second, in MB/s
    pub throughput: f64,
    pub erased: Vec<usize>,
    pub verified: bool,
    /// Hex CRC32 over the per-shard checksums of the encoded buffer
    pub digest: String,
}

fn shard_checksums(buffer: &[u8], shard_size: usize) -> Vec<u32> {
    buffer.chunks_exact(shard_size).map(crc32fast::hash).collect()
}

fn digest(checksums: &[u32]) -> String {
    let mut hasher = crc32fast::Hasher::new();
    for checksum in checksums {
        hasher.update(&checksum.to_le_bytes());
    }
    hex::encode(hasher.finalize().to_be_bytes())
}

/// Encode, erase, decode and verify one case
pub fn run_case(config: &HarnessConfig, case: BenchCase, seed: u64) -> RsResult<CaseReport> {
    let rs = ReedSolomon::builder()
        .data_shards(case.data)
        .parity_shards(case.parity)
        .codec(config.codec)
        .build()?;

    let total = case.data + case.parity;
    let layout = BufferLayout::whole(case.shard_size, total);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut buffer = vec![0u8; layout.buffer_size];
    rng.fill_bytes(&mut buffer[..case.data * case.shard_size]);

    let samples = config.samples.max(1);
    let start = Instant::now();
    for _ in 0..samples {
        rs.encode_buffer(&mut buffer, layout)?;
    }
    let elapsed = start.elapsed();

    let checksums = shard_checksums(&buffer, case.shard_size);

    let mut indices: Vec<usize> = (0..total).collect();
    indices.shuffle(&mut rng);
    let erase_count = rng.random_range(1..=case.parity);
    let mut erased = indices[..erase_count].to_vec();
    erased.sort_unstable();

    let mut targets = ShardMask::empty();
    for &index in &erased {
        targets.insert(index)?;
        let start = index * case.shard_size;
        rng.fill_bytes(&mut buffer[start..start + case.shard_size]);
    }

    rs.decode_buffer(&mut buffer, layout, targets)?;

    let mut scratch = vec![0u8; case.shard_size];
    let verified = shard_checksums(&buffer, case.shard_size) == checksums
        && rs.is_parity_correct_buffer(&buffer, layout, &mut scratch)?;

    let latency = elapsed / samples as u32;
    let seconds = elapsed.as_secs_f64().max(f64::EPSILON);
    let throughput = (case.data * case.shard_size * samples) as f64 / seconds / 1_000_000.0;

    debug!(
        "Case k={} m={} size={}: erased {:?}, verified={}",
        case.data, case.parity, case.shard_size, erased, verified
    );

    Ok(CaseReport {
        case,
        latency,
        throughput,
        erased,
        verified,
        digest: digest(&checksums),
    })
}

/// Run every case on a pool sized by [`HarnessConfig::effective_threads`]
pub fn run(config: &HarnessConfig) -> Result<Vec<CaseReport>> {
    let threads = config.effective_threads();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("failed to build thread pool")?;

    let cases = config.cases();
    debug!("Running {} cases on {} threads", cases.len(), threads);

    let reports = pool.install(|| {
        cases
            .par_iter()
            .enumerate()
            .map(|(i, &case)| run_case(config, case, config.seed.wrapping_add(i as u64)))
            .collect::<RsResult<Vec<_>>>()
    })?;

    Ok(reports)
}
