//! A term database: knowledge-base records indexed by term.

use tracing::{info, instrument};

use crate::avl_map::{AvlMap, Comparisons};
use crate::error::Result;
use crate::query::{BatchReport, QueryOutcome};
use crate::record::{Record, RecordSource};

/// What the database stores for a term.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
    pub tag: String,
    pub score: f64,
}

/// Records keyed by term in an [`AvlMap`].
///
/// The first record seen for a term is kept; later records for the same term
/// are ignored.
///
/// # Examples
///
/// ```
/// use avl_index::{Record, TermDatabase};
///
/// let db: TermDatabase = [Record::new("dog", "animal", 0.9)].into_iter().collect();
/// assert!(db.find("dog").is_found());
/// assert!(!db.find("cat").is_found());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TermDatabase {
    index: AvlMap<String, Definition>,
}

impl TermDatabase {
    #[must_use]
    pub const fn new() -> Self {
        Self { index: AvlMap::new() }
    }

    /// Reads every well-formed record of `source` into a new database.
    ///
    /// # Errors
    ///
    /// Fails if the source cannot be opened or a read fails part-way through.
    /// Malformed lines are skipped, not reported as errors.
    #[instrument(skip_all, fields(path = %source.path().display()))]
    pub fn load(source: &RecordSource) -> Result<Self> {
        let mut db = Self::new();
        let mut records = source.records()?;
        let mut duplicates = 0usize;
        for record in records.by_ref() {
            if !db.insert(record?) {
                duplicates += 1;
            }
        }
        info!(
            terms = db.len(),
            duplicates,
            skipped = records.skipped(),
            "Loaded term database"
        );
        Ok(db)
    }

    /// Adds a record, returning `false` if its term was already present.
    pub fn insert(&mut self, record: Record) -> bool {
        let Record { term, tag, score } = record;
        self.index.insert(term, Definition { tag, score })
    }

    /// Looks up a single term.
    #[must_use]
    pub fn find(&self, term: &str) -> QueryOutcome {
        match self.index.get_key_value(term) {
            Some((term, definition)) => QueryOutcome::Found(Record {
                term: term.clone(),
                tag: definition.tag.clone(),
                score: definition.score,
            }),
            None => QueryOutcome::NotFound(term.to_string()),
        }
    }

    /// Looks up every term in order and tallies the results.
    pub fn find_all<I, S>(&self, terms: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        terms.into_iter().map(|term| self.find(term.as_ref())).collect()
    }

    /// The underlying index.
    #[must_use]
    pub fn index(&self) -> &AvlMap<String, Definition> {
        &self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Comparison counters accumulated since the last reset.
    #[must_use]
    pub fn comparisons(&self) -> Comparisons {
        self.index.comparisons()
    }

    pub fn reset_counters(&self) {
        self.index.reset_counters();
    }
}

impl FromIterator<Record> for TermDatabase {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        let mut db = TermDatabase::new();
        db.extend(iter);
        db
    }
}

impl Extend<Record> for TermDatabase {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}
