//! Results of single and batch term queries.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::record::Record;

/// The result of looking up one term.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutcome {
    Found(Record),
    NotFound(String),
}

impl QueryOutcome {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, QueryOutcome::Found(_))
    }

    /// The term that was queried.
    #[must_use]
    pub fn term(&self) -> &str {
        match self {
            QueryOutcome::Found(record) => &record.term,
            QueryOutcome::NotFound(term) => term,
        }
    }

    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        match self {
            QueryOutcome::Found(record) => Some(record),
            QueryOutcome::NotFound(_) => None,
        }
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Found(record) => {
                writeln!(f, "Term: {}", record.term)?;
                writeln!(f, "Tree: {}", record.tag)?;
                write!(f, "Confidence: ({})", record.score)
            }
            QueryOutcome::NotFound(term) => write!(f, "Term not found: {term}"),
        }
    }
}

/// Outcomes of a batch of queries, in query order, with the running tally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<QueryOutcome>,
    pub found: usize,
    pub not_found: usize,
}

impl BatchReport {
    /// Records one outcome.
    pub fn push(&mut self, outcome: QueryOutcome) {
        if outcome.is_found() {
            self.found += 1;
        } else {
            self.not_found += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Number of terms queried so far.
    #[must_use]
    pub fn total(&self) -> usize {
        self.found + self.not_found
    }
}

impl Extend<QueryOutcome> for BatchReport {
    fn extend<T: IntoIterator<Item = QueryOutcome>>(&mut self, iter: T) {
        for outcome in iter {
            self.push(outcome);
        }
    }
}

impl FromIterator<QueryOutcome> for BatchReport {
    fn from_iter<T: IntoIterator<Item = QueryOutcome>>(iter: T) -> Self {
        let mut report = BatchReport::default();
        report.extend(iter);
        report
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found {} out of {} terms.", self.found, self.total())
    }
}

/// Reads one query term per line, trimming whitespace and dropping blank lines.
///
/// Blank lines are not queries, so they do not count towards a batch's
/// "out of N terms" total.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file cannot be read.
pub fn read_terms(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect())
}
