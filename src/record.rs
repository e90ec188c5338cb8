//! Tab-separated knowledge-base records and the file they are read from.
//!
//! Each line of a source file holds one record: `term<TAB>tag<TAB>score`.
//! Lines that do not have exactly three fields, whose score is not a number, or
//! that are not valid UTF-8 are skipped with a warning rather than failing the
//! whole load.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// One knowledge-base statement about a term.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// The index key.
    pub term: String,
    /// What the term is classified as.
    pub tag: String,
    /// Confidence in the statement.
    pub score: f64,
}

/// Why a line could not be turned into a [`Record`].
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ParseLineError {
    #[error("expected 3 tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("invalid score {value:?}: {source}")]
    Score {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

impl Record {
    pub fn new(term: impl Into<String>, tag: impl Into<String>, score: f64) -> Self {
        Self {
            term: term.into(),
            tag: tag.into(),
            score,
        }
    }

    /// Parses a single `term<TAB>tag<TAB>score` line.
    ///
    /// A trailing carriage return is ignored, as is whitespace around the score.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::{ParseLineError, Record};
    ///
    /// let record = Record::parse_line("dog\tanimal\t0.9").unwrap();
    /// assert_eq!(record, Record::new("dog", "animal", 0.9));
    ///
    /// assert_eq!(Record::parse_line("dog\tanimal"), Err(ParseLineError::FieldCount(2)));
    /// ```
    pub fn parse_line(line: &str) -> core::result::Result<Self, ParseLineError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let fields: Vec<&str> = line.split('\t').collect();
        let [term, tag, score] = fields.as_slice() else {
            return Err(ParseLineError::FieldCount(fields.len()));
        };
        let score = score.trim().parse::<f64>().map_err(|source| ParseLineError::Score {
            value: (*score).to_string(),
            source,
        })?;
        Ok(Self::new(*term, *tag, score))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.term, self.tag, self.score)
    }
}

/// A record file that can be read any number of times.
///
/// Opening checks that the file is readable; each call to
/// [`records`](RecordSource::records) re-opens it and streams it lazily.
#[derive(Clone, Debug)]
pub struct RecordSource {
    path: PathBuf,
}

impl RecordSource {
    /// Opens a record file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file is missing or cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        File::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Starts a fresh pass over the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file has become unreadable since it was opened.
    pub fn records(&self) -> Result<Records> {
        let file = File::open(&self.path).map_err(|source| Error::Open {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "Reading records");
        Ok(Records {
            reader: BufReader::new(file),
            buf: Vec::new(),
            path: self.path.clone(),
            line_number: 0,
            skipped: 0,
            done: false,
        })
    }
}

/// A lazy pass over a [`RecordSource`].
///
/// Yields well-formed records in file order. Malformed lines, including lines
/// that are not valid UTF-8, are skipped and counted; an I/O error is yielded
/// once and ends the pass.
pub struct Records {
    reader: BufReader<File>,
    buf: Vec<u8>,
    path: PathBuf,
    line_number: usize,
    skipped: usize,
    done: bool,
}

impl Records {
    /// Number of malformed lines skipped so far.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn skip(&mut self, reason: &dyn fmt::Display) {
        self.skipped += 1;
        warn!(path = %self.path.display(), line = self.line_number, "Skipping malformed record: {reason}");
    }
}

impl Iterator for Records {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(source) => {
                    self.done = true;
                    return Some(Err(Error::Read {
                        path: self.path.clone(),
                        source,
                    }));
                }
            }
            self.line_number += 1;

            let parsed = match std::str::from_utf8(&self.buf) {
                Ok(line) => {
                    let line = line.strip_suffix('\n').unwrap_or(line);
                    if line.trim().is_empty() {
                        continue;
                    }
                    Record::parse_line(line)
                }
                Err(e) => {
                    self.skip(&e);
                    continue;
                }
            };
            match parsed {
                Ok(record) => return Some(Ok(record)),
                Err(e) => self.skip(&e),
            }
        }
    }
}

impl fmt::Debug for Records {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("path", &self.path)
            .field("line_number", &self.line_number)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}
