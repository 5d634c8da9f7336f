use clap::{Arg, ArgAction, Command};

/// Command-line definition for the `rs256` benchmark
pub fn build_cli() -> Command {
    Command::new("rs256")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reed-Solomon GF(256) encode/decode benchmark with CRC32 verification")
        .arg(
            Arg::new("data")
                .short('k')
                .long("data")
                .help("Largest number of data shards to benchmark")
                .value_name("K")
                .default_value("20"),
        )
        .arg(
            Arg::new("parity")
                .short('m')
                .long("parity")
                .help("Largest number of parity shards to benchmark")
                .value_name("M")
                .default_value("4"),
        )
        .arg(
            Arg::new("shard_sizes")
                .short('s')
                .long("shard-sizes")
                .help("Comma-separated shard sizes in bytes")
                .value_name("BYTES")
                .default_value("4096,65536,262144"),
        )
        .arg(
            Arg::new("samples")
                .short('n')
                .long("samples")
                .help("Encode calls timed per case")
                .value_name("COUNT")
                .default_value("40"),
        )
        .arg(
            Arg::new("codec")
                .short('c')
                .long("codec")
                .help("Region codec: auto, scalar, unrolled, ssse3")
                .value_name("CODEC")
                .default_value("auto"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for shard contents and corruption patterns")
                .value_name("SEED")
                .default_value("0"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .help("Number of CPU threads for computation (0 = auto-detect)")
                .value_name("N")
                .default_value("0"),
        )
        .arg(
            Arg::new("no-parallel")
                .long("no-parallel")
                .help("Run cases one at a time")
                .action(ArgAction::SetTrue),
        )
}

pub fn parse_args() -> clap::ArgMatches {
    build_cli().get_matches()
}
