// compare.rs: two-phase comparison of a candidate log against a reference log
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{InvalidFormat, LogfinderError};
use crate::index::ReferenceIndex;
use crate::tokenizer::{tokenize, TokenKey};

/// What to do with a line that has no syslog timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the whole run on the first malformed line.
    #[default]
    Abort,
    /// Log a warning, count the line as skipped and carry on.
    Skip,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompareStats {
    pub reference_lines: usize,
    pub distinct_keys: usize,
    pub candidate_lines: usize,
    pub unmatched: usize,
    pub skipped: usize,
}

/// A candidate line with no similar line in the reference index.
#[derive(Debug, Serialize)]
pub struct UnmatchedLine<'a> {
    pub line_no: usize,
    pub line: &'a str,
    pub tokens: &'a TokenKey,
}

// Forward-only line source; yields lines without their terminator.
struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self { reader, buf: Vec::with_capacity(256), line_no: 0 }
    }

    fn next_line(&mut self) -> io::Result<Option<(usize, Cow<'_, str>)>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let mut end = self.buf.len();
        if end > 0 && self.buf[end - 1] == b'\n' {
            end -= 1;
            if end > 0 && self.buf[end - 1] == b'\r' {
                end -= 1;
            }
        }
        Ok(Some((self.line_no, String::from_utf8_lossy(&self.buf[..end]))))
    }
}

// Ok(None) means the line was skipped under MalformedPolicy::Skip.
fn check_line<T>(
    result: Result<T, InvalidFormat>,
    origin: &str,
    line_no: usize,
    policy: MalformedPolicy,
    stats: &mut CompareStats,
) -> Result<Option<T>, LogfinderError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(source) => match policy {
            MalformedPolicy::Abort => {
                Err(LogfinderError::Format { origin: origin.to_string(), line_no, source })
            }
            MalformedPolicy::Skip => {
                warn!(origin, line_no, error = %source, "skipping malformed line");
                stats.skipped += 1;
                Ok(None)
            }
        },
    }
}

/// Read every line of the reference source into a fresh index.
pub fn build_index<R: BufRead>(
    reader: R,
    origin: &str,
    policy: MalformedPolicy,
    stats: &mut CompareStats,
) -> Result<ReferenceIndex, LogfinderError> {
    let mut index = ReferenceIndex::new();
    let mut lines = LineReader::new(reader);
    while let Some((line_no, line)) =
        lines.next_line().map_err(|e| LogfinderError::io(origin, e))?
    {
        stats.reference_lines += 1;
        if let Some(key) = check_line(tokenize(&line), origin, line_no, policy, stats)? {
            index.insert_key(key);
        }
    }
    stats.distinct_keys = index.len();
    debug!(origin, lines = stats.reference_lines, keys = index.len(), "reference index built");
    Ok(index)
}

/// Stream the candidate source and hand every line without a similar
/// reference line to `emit`, in input order.
pub fn find_unmatched<R, F>(
    reader: R,
    origin: &str,
    index: &ReferenceIndex,
    policy: MalformedPolicy,
    stats: &mut CompareStats,
    mut emit: F,
) -> Result<(), LogfinderError>
where
    R: BufRead,
    F: FnMut(&UnmatchedLine<'_>) -> io::Result<()>,
{
    let mut lines = LineReader::new(reader);
    while let Some((line_no, line)) =
        lines.next_line().map_err(|e| LogfinderError::io(origin, e))?
    {
        stats.candidate_lines += 1;
        let Some(key) = check_line(tokenize(&line), origin, line_no, policy, stats)? else {
            continue;
        };
        if index.contains_key(&key) {
            continue;
        }
        stats.unmatched += 1;
        emit(&UnmatchedLine { line_no, line: &line, tokens: &key }).map_err(LogfinderError::Output)?;
    }
    debug!(origin, lines = stats.candidate_lines, unmatched = stats.unmatched, "candidate pass done");
    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>, LogfinderError> {
    File::open(path).map(BufReader::new).map_err(|e| LogfinderError::io(path, e))
}

/// Emit the lines of `candidate` that have no similar line in `reference`.
/// Both files are opened before either is read.
pub fn compare_files<F>(
    candidate: &Path,
    reference: &Path,
    policy: MalformedPolicy,
    emit: F,
) -> Result<CompareStats, LogfinderError>
where
    F: FnMut(&UnmatchedLine<'_>) -> io::Result<()>,
{
    let candidate_reader = open(candidate)?;
    let reference_reader = open(reference)?;
    let mut stats = CompareStats::default();

    let index = build_index(
        reference_reader,
        &reference.display().to_string(),
        policy,
        &mut stats,
    )?;
    find_unmatched(
        candidate_reader,
        &candidate.display().to_string(),
        &index,
        policy,
        &mut stats,
        emit,
    )?;
    Ok(stats)
}
