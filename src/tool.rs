// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! CLI tool for indexing text files and comparing hash functions

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use humansize::{SizeFormatter, BINARY};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
    registry::Registry,
};
use word_index::{
    ArenaList, Config, FastHashTable, HashFunction, HashKind, HashTable, InsertPolicy, TableStats,
    HASH_TABLE_SIZE,
};

macro_rules! die {
    ($fmt:literal, $($arg:tt)*) => {{
        eprintln!($fmt, $($arg)*);
        std::process::exit(1);
    }};

    ($msg:literal) => {{
        eprintln!($msg);
        std::process::exit(1);
    }};

    () => {{
        eprintln!("Program terminated unexpectedly");
        std::process::exit(1);
    }};
}

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

pub fn init_tracing(quiet: bool, verbose: u8) -> (bool, LevelFilter) {
    let is_verbose = !quiet && verbose > 0;

    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Bridge log crate macros to tracing (for library code that uses log::*)
    tracing_log::LogTracer::init().expect("Failed to set log tracer");

    let registry = Registry::default();

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("WORDIDX_LOG")
        .from_env_lossy();

    let subscriber = registry.with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact(),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        die!("INTERNAL ERROR: setting default tracing::subscriber failed");
    }

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing_panic::panic_hook(info);
        prev_hook(info); // daisy-chain to old panic hook
    }));

    (is_verbose, level_filter)
}

/// CLI tool for indexing text files and comparing hash functions
#[derive(Parser, Debug)]
#[command(name = "wordidx")]
#[command(about = "CLI tool for indexing text files and comparing hash functions")]
struct ToolArgs {
    /// Suppress all output except for errors. This overrides the -v flag.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Turn on verbose output. Supply -v multiple times to increase verbosity.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: ToolCommand,
}

/// Options shared by all commands that build a table
#[derive(Args, Debug, Clone)]
struct TableArgs {
    /// Hash function (ignored with --fast, which always uses crc32)
    #[arg(long = "hash", default_value = "crc32", value_name = "HASH")]
    hash: HashKind,

    /// Use the CRC-32C bound table with batched compares
    #[arg(short, long, default_value_t = false)]
    fast: bool,

    /// Number of buckets
    #[arg(short, long, default_value_t = HASH_TABLE_SIZE)]
    buckets: usize,

    /// Store every word only once
    #[arg(long, default_value_t = false)]
    dedup: bool,

    /// Lowercase the text before indexing
    #[arg(long, default_value_t = false)]
    fold_case: bool,
}

impl TableArgs {
    fn config(&self) -> Config {
        let policy = if self.dedup {
            InsertPolicy::Deduplicate
        } else {
            InsertPolicy::Append
        };

        Config::new()
            .bucket_count(self.buckets)
            .insert_policy(policy)
            .fold_case(self.fold_case)
    }
}

#[derive(Subcommand, Debug, Clone)]
enum ToolCommand {
    /// Index a file and print the chain length distribution
    Stats {
        /// Text file to index
        file: PathBuf,

        #[command(flatten)]
        table: TableArgs,
    },
    /// Index a file once per hash function and compare distribution and timing
    Compare {
        /// Text file to index
        file: PathBuf,

        /// Number of buckets
        #[arg(short, long, default_value_t = HASH_TABLE_SIZE)]
        buckets: usize,
    },
    /// Write the `bucket,length` distribution as CSV
    Distribution {
        /// Text file to index
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        table: TableArgs,
    },
    /// Count occurrences of words
    Search {
        /// Text file to index
        file: PathBuf,

        /// Words to look up
        #[arg(required = true)]
        words: Vec<String>,

        #[command(flatten)]
        table: TableArgs,
    },
    /// Dump the arena of one bucket
    Dump {
        /// Text file to index
        file: PathBuf,

        /// Bucket to dump
        #[arg(long)]
        bucket: usize,

        #[command(flatten)]
        table: TableArgs,
    },
}

/// A filled table of either strategy
enum Index {
    Baseline {
        table: HashTable,
        hasher: Box<dyn HashFunction>,
    },
    Fast(FastHashTable),
}

impl Index {
    fn open(args: &TableArgs) -> word_index::Result<Self> {
        let config = args.config();

        if args.fast {
            Ok(Self::Fast(config.open_fast()?))
        } else {
            Ok(Self::Baseline {
                table: config.open()?,
                hasher: args.hash.build(),
            })
        }
    }

    fn open_filled(args: &TableArgs, path: &Path) -> Self {
        let mut index = match Self::open(args) {
            Ok(index) => index,
            Err(e) => die!("Error creating table: {}", e),
        };

        let start = Instant::now();

        let count = match index.fill(path) {
            Ok(count) => count,
            Err(e) => die!("Error indexing {}: {}", path.display(), e),
        };

        info!(
            "indexed {count} words ({}) using {} in {:?}",
            file_size(path),
            index.hash_name(),
            start.elapsed(),
        );

        index
    }

    fn fill(&mut self, path: &Path) -> word_index::Result<usize> {
        match self {
            Self::Baseline { table, hasher } => table.fill_from_file(path, hasher.as_ref()),
            Self::Fast(table) => table.fill_from_file(path),
        }
    }

    fn hash_name(&self) -> &'static str {
        match self {
            Self::Baseline { hasher, .. } => hasher.name(),
            Self::Fast(_) => "crc32 (fast)",
        }
    }

    fn count(&self, word: &[u8]) -> usize {
        match self {
            Self::Baseline { table, hasher } => table.count(word, hasher.as_ref()),
            Self::Fast(table) => table.count(word),
        }
    }

    fn stats(&self) -> TableStats {
        match self {
            Self::Baseline { table, .. } => table.stats(),
            Self::Fast(table) => table.stats(),
        }
    }

    fn bucket(&self, idx: usize) -> Option<&ArenaList> {
        match self {
            Self::Baseline { table, .. } => table.bucket(idx),
            Self::Fast(table) => table.bucket(idx),
        }
    }

    fn write_distribution<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Self::Baseline { table, .. } => table.write_distribution(writer),
            Self::Fast(table) => table.write_distribution(writer),
        }
    }
}

fn file_size(path: &Path) -> String {
    std::fs::metadata(path).map_or_else(
        |_| String::from("unknown size"),
        |meta| SizeFormatter::new(meta.len(), BINARY).to_string(),
    )
}

fn print_stats(name: &str, stats: &TableStats) {
    println!("{name}: {stats}");

    let mut histogram: Vec<_> = stats.histogram.iter().collect();
    histogram.sort_unstable();

    for (len, buckets) in histogram.into_iter().take(16) {
        println!("  chain length {len:>4}: {buckets} buckets");
    }
}

fn handle_compare(path: &Path, buckets: usize) {
    let buffer = match word_index::loader::read_buffer(path) {
        Ok(buffer) => buffer,
        Err(e) => die!("Error reading {}: {}", path.display(), e),
    };

    println!("{} ({})", path.display(), file_size(path));
    println!(
        "{:<16} {:>10} {:>12} {:>10} {:>10} {:>10}",
        "hash", "time", "occupied", "longest", "mean", "std dev"
    );

    for kind in HashKind::ALL {
        let mut table = match HashTable::with_config(Config::new().bucket_count(buckets)) {
            Ok(table) => table,
            Err(e) => die!("Error creating table: {}", e),
        };

        let hasher = kind.build();
        let start = Instant::now();

        if let Err(e) = table.fill_from_buffer(&buffer, hasher.as_ref()) {
            die!("Error indexing with {}: {}", kind, e);
        }

        print_row(kind.name(), start, &table.stats());
    }

    let mut table = match FastHashTable::new(buckets) {
        Ok(table) => table,
        Err(e) => die!("Error creating table: {}", e),
    };

    let start = Instant::now();

    if let Err(e) = table.fill_from_buffer(&buffer) {
        die!("Error indexing with fast table: {}", e);
    }

    let name = if table.is_accelerated() {
        "crc32 (fast/hw)"
    } else {
        "crc32 (fast/sw)"
    };

    print_row(name, start, &table.stats());
}

fn print_row(name: &str, start: Instant, stats: &TableStats) {
    println!(
        "{:<16} {:>10.2?} {:>12} {:>10} {:>10.2} {:>10.2}",
        name,
        start.elapsed(),
        stats.occupied_buckets,
        stats.longest_chain,
        stats.mean_chain,
        stats.std_dev,
    );
}

fn handle_distribution(index: &Index, output: Option<&Path>) {
    let result = match output {
        Some(path) => File::create(path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            index.write_distribution(&mut writer)?;
            writer.flush()
        }),
        None => index.write_distribution(&mut io::stdout().lock()),
    };

    if let Err(e) = result {
        die!("Error writing distribution: {}", e);
    }
}

fn handle_search(index: &Index, words: &[String]) {
    for word in words {
        println!("{word}: {}", index.count(word.as_bytes()));
    }
}

fn handle_dump(index: &Index, bucket: usize) {
    let Some(list) = index.bucket(bucket) else {
        die!("Bucket {} does not exist", bucket);
    };

    if let Err(e) = list.verify() {
        warn!("bucket {bucket} is damaged: {e}");
    }

    if let Err(e) = list.dump(&mut io::stdout().lock()) {
        die!("Error writing dump: {}", e);
    }
}

fn main() {
    let args = ToolArgs::parse();
    let (_, level_filter) = init_tracing(args.quiet, args.verbose);

    let cmd = ToolArgs::command();

    info!(
        "starting {} ({} {}), log level: {level_filter}",
        cmd.get_name(),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    match args.command {
        ToolCommand::Stats { file, table } => {
            let index = Index::open_filled(&table, &file);
            print_stats(index.hash_name(), &index.stats());
        }
        ToolCommand::Compare { file, buckets } => handle_compare(&file, buckets),
        ToolCommand::Distribution {
            file,
            output,
            table,
        } => {
            let index = Index::open_filled(&table, &file);
            handle_distribution(&index, output.as_deref());
        }
        ToolCommand::Search { file, words, table } => {
            let index = Index::open_filled(&table, &file);
            handle_search(&index, &words);
        }
        ToolCommand::Dump {
            file,
            bucket,
            table,
        } => {
            let index = Index::open_filled(&table, &file);
            handle_dump(&index, bucket);
        }
    }
}
