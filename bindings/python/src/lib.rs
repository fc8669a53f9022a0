// PyO3 bindings for logfinder_core
use std::path::Path;

use pyo3::exceptions::{PyOSError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyModule;

use logfinder_core as core;

// Parallel tokenization for batch inserts
use rayon::prelude::*;

fn format_err(e: core::InvalidFormat) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn run_err(e: core::LogfinderError) -> PyErr {
    match e {
        core::LogfinderError::Format { .. } => PyValueError::new_err(e.to_string()),
        core::LogfinderError::Io { .. } | core::LogfinderError::Output(_) => PyOSError::new_err(e.to_string()),
    }
}

/// Set of normalized syslog lines. Timestamps are ignored and numbers match
/// any other number.
#[pyclass(module = "logfinder_rs")]
#[derive(Default)]
struct SyslogSet {
    inner: core::ReferenceIndex,
}

#[pymethods]
impl SyslogSet {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    /// Add a line. Raises ValueError if it has no syslog timestamp.
    #[pyo3(text_signature = "($self, line)")]
    fn add_line(&mut self, line: &str) -> PyResult<()> {
        self.inner.add_line(line).map_err(format_err)
    }

    /// Add many lines and return how many new entries they produced.
    /// Tokenizing happens in parallel; nothing is inserted if any line is
    /// malformed.
    #[pyo3(text_signature = "($self, lines)")]
    fn add_lines(&mut self, lines: Vec<String>) -> PyResult<usize> {
        let keys: Vec<core::TokenKey> = lines
            .par_iter()
            .map(|line| core::tokenize(line))
            .collect::<Result<_, _>>()
            .map_err(format_err)?;
        Ok(self.inner.extend_keys(keys))
    }

    /// True if a similar line was added before.
    #[pyo3(text_signature = "($self, line)")]
    fn line_exists(&self, line: &str) -> PyResult<bool> {
        self.inner.line_exists(line).map_err(format_err)
    }

    fn __contains__(&self, line: &str) -> PyResult<bool> {
        self.line_exists(line)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

/// Return the message body after the syslog timestamp.
#[pyfunction]
#[pyo3(text_signature = "(line)")]
fn strip_date(line: &str) -> PyResult<String> {
    core::strip_date(line).map(str::to_string).map_err(format_err)
}

/// Split text on runs of ASCII digits, dropping the digits.
#[pyfunction]
#[pyo3(text_signature = "(body)")]
fn split_numeric(body: &str) -> Vec<String> {
    core::split_numeric(body).into_iter().map(str::to_string).collect()
}

/// Return the comparison key of a syslog line as a list of fragments.
#[pyfunction]
#[pyo3(text_signature = "(line)")]
fn tokenize(line: &str) -> PyResult<Vec<String>> {
    core::tokenize(line).map(core::TokenKey::into_inner).map_err(format_err)
}

/// Return the lines of file1 that have no similar line in file2.
#[pyfunction]
#[pyo3(signature = (file1, file2, skip_malformed = false))]
fn compare_files(file1: &str, file2: &str, skip_malformed: bool) -> PyResult<Vec<String>> {
    let policy = if skip_malformed { core::MalformedPolicy::Skip } else { core::MalformedPolicy::Abort };
    let mut out = Vec::new();
    core::compare_files(Path::new(file1), Path::new(file2), policy, |u| {
        out.push(u.line.to_string());
        Ok(())
    })
    .map_err(run_err)?;
    Ok(out)
}

#[pymodule]
#[pyo3(module = "logfinder_rs")]
fn logfinder_rs(_py: Python, m: &Bound<PyModule>) -> PyResult<()> {
    m.add(
        "__doc__",
        "Find syslog lines with no similar line in a reference log.\n\n\
        Timestamps are ignored and any run of digits matches any other.\n\n\
        Quick start:\n\
        >>> import logfinder_rs as lf\n\
        >>> s = lf.SyslogSet()\n\
        >>> s.add_line('Aug 31 19:35:34 host used 5 MB')\n\
        >>> s.line_exists('Sep  1 08:00:00 host used 9000 MB')\n\
        True",
    )?;

    m.add_class::<SyslogSet>()?;

    m.add_function(wrap_pyfunction!(strip_date, m)?)?;
    m.add_function(wrap_pyfunction!(split_numeric, m)?)?;
    m.add_function(wrap_pyfunction!(tokenize, m)?)?;
    m.add_function(wrap_pyfunction!(compare_files, m)?)?;

    Ok(())
}
