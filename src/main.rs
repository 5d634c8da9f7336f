//! `rs256` benchmark binary
//!
//! Encodes, erases, decodes and verifies every configured case, printing one
//! table row per case.

use anyhow::{bail, Result};
use rs256::harness::{self, CaseReport, HarnessConfig};
use rs256::parse_args;

fn display(columns: [String; 6]) {
    println!(
        "{:>10} | {:>10} | {:>10} | {:>10} | {:>14} | {:>8}",
        columns[0], columns[1], columns[2], columns[3], columns[4], columns[5]
    );
}

fn divider() {
    println!("{}", "-".repeat(87));
}

fn report_row(report: &CaseReport) -> [String; 6] {
    [
        report.case.data.to_string(),
        report.case.parity.to_string(),
        report.case.shard_size.to_string(),
        format!("{:.3}ms", report.latency.as_secs_f64() * 1000.0),
        format!("{:.2} MB/s", report.throughput),
        report.digest.clone(),
    ]
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = parse_args();
    let config = HarnessConfig::from_args(&matches)?;

    println!();
    println!("{:>10} | {}", "CODEC", format!("{:?}", config.codec).to_lowercase());
    println!("{:>10} | {}", "THREADS", config.effective_threads());
    println!("{:>10} | {}", "SAMPLES", config.samples);
    println!();
    divider();
    display([
        "DATA".into(),
        "PARITY".into(),
        "SHARD SIZE".into(),
        "LATENCY".into(),
        "THROUGHPUT".into(),
        "DIGEST".into(),
    ]);

    let reports = harness::run(&config)?;

    let first_size = config.shard_sizes.first().copied();
    for report in &reports {
        if Some(report.case.shard_size) == first_size {
            divider();
        }
        display(report_row(report));
    }
    divider();

    let failed: Vec<_> = reports.iter().filter(|r| !r.verified).collect();
    if !failed.is_empty() {
        for report in &failed {
            eprintln!(
                "Verification failed: k={} m={} size={} erased={:?}",
                report.case.data, report.case.parity, report.case.shard_size, report.erased
            );
        }
        bail!("{} of {} cases failed verification", failed.len(), reports.len());
    }

    Ok(())
}
