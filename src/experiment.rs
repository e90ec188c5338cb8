//! Empirical cost of insertion and search, measured with the index's counters.
//!
//! For each subset size the experiment shuffles the full record set, builds a
//! fresh index from the first `n` records, and then runs every query against it.
//! The counters are reset before each individual operation so that every sample
//! is the cost of exactly one insert or one search.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, info, instrument};

use crate::avl_map::AvlMap;
use crate::error::{Error, Result};
use crate::record::Record;

/// Subset sizes measured when none are configured.
pub const DEFAULT_SIZES: [usize; 5] = [5, 50, 500, 5_000, 50_000];

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0x5eed;

/// CSV header written by [`write_csv`].
pub const CSV_HEADER: &str = "n,InsertMin,InsertAvg,InsertMax,SearchMin,SearchAvg,SearchMax";

/// Minimum, mean and maximum of a set of comparison counts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    pub min: u64,
    pub avg: f64,
    pub max: u64,
}

impl Stats {
    /// Summarises `samples`. An empty sample set summarises to all zeros.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::experiment::Stats;
    ///
    /// let stats = Stats::from_samples(&[1, 2, 6]);
    /// assert_eq!((stats.min, stats.avg, stats.max), (1, 3.0, 6));
    /// ```
    #[must_use]
    pub fn from_samples(samples: &[u64]) -> Self {
        let (Some(&min), Some(&max)) = (samples.iter().min(), samples.iter().max()) else {
            return Self::default();
        };
        let sum: u64 = samples.iter().sum();
        #[allow(clippy::cast_precision_loss)]
        let avg = sum as f64 / samples.len() as f64;
        Self { min, avg, max }
    }
}

/// One line of the results table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExperimentRow {
    /// Number of records inserted.
    pub n: usize,
    pub insert: Stats,
    pub search: Stats,
}

/// A configured benchmark run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Experiment {
    sizes: Vec<usize>,
    seed: u64,
}

impl Default for Experiment {
    fn default() -> Self {
        Self::new(DEFAULT_SIZES.to_vec(), DEFAULT_SEED)
    }
}

impl Experiment {
    #[must_use]
    pub fn new(sizes: Vec<usize>, seed: u64) -> Self {
        Self { sizes, seed }
    }

    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Measures every configured size, in order.
    ///
    /// A size larger than `records` is capped at `records.len()`. The same seed
    /// always produces the same subsets.
    #[instrument(skip_all, fields(records = records.len(), queries = queries.len()))]
    pub fn run(&self, records: &[Record], queries: &[String]) -> Vec<ExperimentRow> {
        let mut rng = Xoshiro256StarStar::seed_from_u64(self.seed);
        let mut shuffled: Vec<&Record> = records.iter().collect();

        self.sizes
            .iter()
            .map(|&n| {
                let started = Instant::now();
                shuffled.shuffle(&mut rng);
                let subset = &shuffled[..n.min(shuffled.len())];
                let row = measure(n, subset, queries);
                debug!(n, elapsed = ?started.elapsed(), "Measured subset");
                row
            })
            .collect()
    }
}

/// Builds an index from `subset` and queries it, one counted operation at a time.
fn measure(n: usize, subset: &[&Record], queries: &[String]) -> ExperimentRow {
    let mut index: AvlMap<&str, &Record> = AvlMap::with_capacity(subset.len());

    let insert_samples: Vec<u64> = subset
        .iter()
        .map(|record| {
            index.reset_counters();
            index.insert(record.term.as_str(), *record);
            index.insert_comparisons()
        })
        .collect();

    let search_samples: Vec<u64> = queries
        .iter()
        .map(|query| {
            index.reset_counters();
            let _ = index.lookup(query.as_str());
            index.search_comparisons()
        })
        .collect();

    ExperimentRow {
        n,
        insert: Stats::from_samples(&insert_samples),
        search: Stats::from_samples(&search_samples),
    }
}

/// Writes `rows` as CSV with a [`CSV_HEADER`] line. Averages keep two decimals.
///
/// # Errors
///
/// Propagates any error from `out`.
pub fn write_csv<W: Write>(rows: &[ExperimentRow], mut out: W) -> io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for row in rows {
        writeln!(
            out,
            "{},{},{:.2},{},{},{:.2},{}",
            row.n, row.insert.min, row.insert.avg, row.insert.max, row.search.min, row.search.avg, row.search.max
        )?;
    }
    out.flush()
}

/// Writes `rows` to a CSV file at `path`.
///
/// # Errors
///
/// Returns [`Error::Write`] if the file cannot be created or written.
pub fn write_csv_file(rows: &[ExperimentRow], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let to_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_error)?;
    write_csv(rows, BufWriter::new(file)).map_err(to_error)?;
    info!(path = %path.display(), rows = rows.len(), "Wrote results");
    Ok(())
}

/// Copies `input` to `output` with its lines in a seeded random order.
///
/// Useful for producing an unsorted record file so that an index is not only
/// ever built from sorted input. Returns the number of lines written.
///
/// # Errors
///
/// Returns [`Error::Read`] or [`Error::Write`] on I/O failure.
pub fn shuffle_lines(input: impl AsRef<Path>, output: impl AsRef<Path>, seed: u64) -> Result<usize> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let contents = fs::read_to_string(input).map_err(|source| Error::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let mut lines: Vec<&str> = contents.lines().collect();
    lines.shuffle(&mut Xoshiro256StarStar::seed_from_u64(seed));

    let mut shuffled = String::with_capacity(contents.len() + 1);
    for line in &lines {
        shuffled.push_str(line);
        shuffled.push('\n');
    }
    fs::write(output, shuffled).map_err(|source| Error::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(lines.len())
}
