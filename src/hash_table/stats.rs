// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{list::ArenaList, HashMap};
use std::io::Write;

/// Chain length distribution of a table
///
/// Used to compare how well hash functions spread a corpus.
#[derive(Clone, Debug, Default)]
pub struct TableStats {
    /// Number of buckets
    pub bucket_count: usize,

    /// Number of stored words
    pub word_count: usize,

    /// Buckets holding at least one word
    pub occupied_buckets: usize,

    /// Length of the longest chain
    pub longest_chain: usize,

    /// Mean chain length over occupied buckets
    pub mean_chain: f64,

    /// Standard deviation of the chain length over all buckets
    pub std_dev: f64,

    /// Chain length -> number of buckets with that length
    pub histogram: HashMap<usize, usize>,
}

impl TableStats {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn collect(lists: &[ArenaList]) -> Self {
        let mut histogram = HashMap::default();

        let mut word_count = 0;
        let mut occupied_buckets = 0;
        let mut longest_chain = 0;

        for list in lists {
            let len = list.len();

            *histogram.entry(len).or_insert(0) += 1;

            word_count += len;
            longest_chain = longest_chain.max(len);

            if len > 0 {
                occupied_buckets += 1;
            }
        }

        let bucket_count = lists.len();

        let mean_chain = if occupied_buckets > 0 {
            word_count as f64 / occupied_buckets as f64
        } else {
            0.0
        };

        let std_dev = if bucket_count > 0 {
            let mean = word_count as f64 / bucket_count as f64;

            let variance = lists
                .iter()
                .map(|list| (list.len() as f64 - mean).powi(2))
                .sum::<f64>()
                / bucket_count as f64;

            variance.sqrt()
        } else {
            0.0
        };

        Self {
            bucket_count,
            word_count,
            occupied_buckets,
            longest_chain,
            mean_chain,
            std_dev,
            histogram,
        }
    }

    /// Ratio of occupied buckets
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn load(&self) -> f64 {
        if self.bucket_count == 0 {
            0.0
        } else {
            self.occupied_buckets as f64 / self.bucket_count as f64
        }
    }
}

impl std::fmt::Display for TableStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} words in {}/{} buckets ({:.1}%), longest chain {}, mean chain {:.2}, std dev {:.2}",
            self.word_count,
            self.occupied_buckets,
            self.bucket_count,
            self.load() * 100.0,
            self.longest_chain,
            self.mean_chain,
            self.std_dev,
        )
    }
}

/// Writes one `bucket,length` CSV line per bucket.
pub(crate) fn write_distribution<W: Write>(lists: &[ArenaList], writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "bucket,length")?;

    for (idx, list) in lists.iter().enumerate() {
        writeln!(writer, "{idx},{}", list.len())?;
    }

    Ok(())
}
