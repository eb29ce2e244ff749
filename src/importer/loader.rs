use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::domain::{Parcel, ParcelError};
use crate::report::{NoopReporter, Reporter};

/// Field separator of the reference cadastre exports
pub const DEFAULT_DELIMITER: char = ';';

/// Failure that aborts a whole load
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read parcels from {origin}")]
    Io {
        origin: String,
        #[source]
        source: io::Error,
    },
    #[error("no valid parcel rows in {origin} ({skipped} rows skipped)")]
    Empty { origin: String, skipped: usize },
}

/// A data row that was dropped during loading
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the source, header included
    pub line: usize,
    pub error: ParcelError,
}

/// Parcels read from one source, in source order
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub parcels: Vec<Parcel>,
    pub skipped: Vec<SkippedRow>,
}

impl LoadOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Reads delimited parcel tables
///
/// The first line is always a header and is discarded. Rows that fail
/// validation are skipped and reported; I/O failures and a table with no
/// valid rows abort the load.
pub struct ParcelLoader<'r> {
    delimiter: char,
    reporter: &'r dyn Reporter,
}

impl Default for ParcelLoader<'_> {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            reporter: &NoopReporter,
        }
    }
}

impl<'r> ParcelLoader<'r> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_reporter(mut self, reporter: &'r dyn Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Load parcels from a file on disk
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadOutcome, LoadError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| LoadError::Io {
            origin: origin.clone(),
            source,
        })?;
        self.load_reader(BufReader::new(file), &origin)
    }

    /// Load parcels from any buffered reader; `origin` names it in errors
    pub fn load_reader<R: BufRead>(&self, mut reader: R, origin: &str) -> Result<LoadOutcome, LoadError> {
        let mut parcels = Vec::new();
        let mut skipped = Vec::new();
        let mut buf = Vec::new();
        let mut line = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| LoadError::Io {
                    origin: origin.to_string(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            line += 1;
            // header
            if line == 1 {
                continue;
            }

            let text = decode_line(&buf);
            if text.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = text.split(self.delimiter).collect();
            match Parcel::from_fields(&fields) {
                Ok(parcel) => parcels.push(parcel),
                Err(error) => {
                    self.reporter.row_skipped(line, &error);
                    skipped.push(SkippedRow { line, error });
                }
            }
        }

        self.reporter.load_finished(parcels.len(), skipped.len());

        if parcels.is_empty() {
            return Err(LoadError::Empty {
                origin: origin.to_string(),
                skipped: skipped.len(),
            });
        }

        Ok(LoadOutcome { parcels, skipped })
    }
}

/// One line without its terminator, as UTF-8 or else as Latin-1
///
/// Older cadastre exports are Latin-1 encoded; every byte sequence decodes,
/// so encoding never costs a row.
fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().copied().map(char::from).collect()),
    }
}
