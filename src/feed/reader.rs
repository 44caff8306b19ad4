use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use super::FeedError;

/// One parsed line of a recording.
///
/// `fields[i]` is file column `i`; the timestamp column stays in place so a
/// panel can address columns exactly as they appear in the file. Unparsable
/// cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub timestamp: f64,
    pub fields: Vec<Option<f64>>,
}

impl LogRow {
    pub fn new(timestamp: f64, fields: Vec<Option<f64>>) -> Self {
        Self { timestamp, fields }
    }
}

/// Where the timestamp lives: a column position for headerless files, a
/// header name for keyed files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeColumn {
    Index(usize),
    Name(String),
}

impl TimeColumn {
    /// Keyed files carry a header row that is not data.
    pub fn is_keyed(&self) -> bool {
        matches!(self, TimeColumn::Name(_))
    }

    pub(crate) fn resolve(&self, header: Option<&[String]>) -> Option<usize> {
        match self {
            TimeColumn::Index(index) => Some(*index),
            TimeColumn::Name(name) => header?.iter().position(|field| field == name),
        }
    }
}

impl Default for TimeColumn {
    fn default() -> Self {
        TimeColumn::Index(0)
    }
}

/// A recording on disk and how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub time_column: TimeColumn,
}

pub(crate) fn default_delimiter() -> char {
    '\t'
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>, time_column: TimeColumn) -> Self {
        Self {
            path: path.into(),
            delimiter: default_delimiter(),
            time_column,
        }
    }
}

/// Read every row with `start <= timestamp < end`, in file order.
///
/// The whole file is scanned from the top on every call. Timestamps are
/// assumed non-decreasing, so the scan stops at the first row at or beyond
/// `end`; rows after that point are not looked at even if they would fall
/// inside the window. Pass `f64::NEG_INFINITY` / `f64::INFINITY` for an open
/// bound.
pub fn read_window(
    path: impl AsRef<Path>,
    delimiter: char,
    time_column: &TimeColumn,
    start: f64,
    end: f64,
) -> Result<Vec<LogRow>, FeedError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| FeedError::access(path, err))?;
    let mut reader = BufReader::new(file);

    let header = if time_column.is_keyed() {
        match next_line(&mut reader).map_err(|err| FeedError::access(path, err))? {
            Some(line) => Some(split_header(&line, delimiter)),
            None => return Ok(Vec::new()),
        }
    } else {
        None
    };

    let Some(time_index) = time_column.resolve(header.as_deref()) else {
        log::debug!(
            "{} has no {time_column:?} column, no rows selected",
            path.display()
        );
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    while let Some(line) = next_line(&mut reader).map_err(|err| FeedError::access(path, err))? {
        let Some(row) = parse_line(&line, delimiter, time_index) else {
            continue;
        };
        if row.timestamp < start {
            continue;
        }
        if row.timestamp >= end {
            break;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Read the header row of a keyed recording. `None` for an empty file.
pub fn read_header(
    path: impl AsRef<Path>,
    delimiter: char,
) -> Result<Option<Vec<String>>, FeedError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| FeedError::access(path, err))?;
    let mut reader = BufReader::new(file);
    let line = next_line(&mut reader).map_err(|err| FeedError::access(path, err))?;
    Ok(line.map(|line| split_header(&line, delimiter)))
}

fn next_line(reader: &mut impl BufRead) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

pub(crate) fn split_header(line: &str, delimiter: char) -> Vec<String> {
    line.trim_start_matches('\u{feff}')
        .trim_end_matches(['\r', '\n'])
        .split(delimiter)
        .map(|name| name.trim().to_string())
        .collect()
}

/// Parse one data line. `None` when the line is blank or its timestamp cell
/// is missing or not a number.
pub(crate) fn parse_line(line: &str, delimiter: char, time_index: usize) -> Option<LogRow> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    let fields: Vec<Option<f64>> = line.split(delimiter).map(parse_field).collect();
    let timestamp = fields.get(time_index).copied().flatten()?;
    Some(LogRow { timestamp, fields })
}

fn parse_field(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
