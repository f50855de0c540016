use std::fmt;

use thiserror::Error;

use crate::{LocationRecord, DEFAULT_CATEGORY, DEFAULT_DIMENSION};

/// Header columns every feed must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "x", "z"];

/// Structural problems that make a feed body unusable as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedFormatError {
    #[error("feed has no header row")]
    MissingHeader,
    #[error("feed header is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },
}

/// Coordinate axis in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Z => f.write_str("z"),
        }
    }
}

/// Why a single data row was left out. Rows are never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("row has {cells} cells, need at least 3")]
    TooFewCells { cells: usize },
    #[error("row has an empty name")]
    MissingName,
    #[error("invalid integer '{value}' for {axis}")]
    InvalidCoordinate { axis: Axis, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the feed body.
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub records: Vec<LocationRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedColumns {
    pub name: usize,
    pub x: usize,
    pub z: usize,
    pub category: Option<usize>,
    pub dimension: Option<usize>,
    pub notes: Option<usize>,
}

impl FeedColumns {
    pub fn from_header(line: &str) -> Result<Self, FeedFormatError> {
        let headers: Vec<String> = split_feed_line(line)
            .into_iter()
            .map(|cell| cell.trim().to_lowercase())
            .collect();
        let position = |column: &str| headers.iter().position(|header| header == column);

        let missing: Vec<&'static str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| position(*column).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(FeedFormatError::MissingColumns { missing });
        }

        match (position("name"), position("x"), position("z")) {
            (Some(name), Some(x), Some(z)) => Ok(Self {
                name,
                x,
                z,
                category: position("category"),
                dimension: position("dimension"),
                notes: position("notes"),
            }),
            _ => Err(FeedFormatError::MissingColumns {
                missing: REQUIRED_COLUMNS.to_vec(),
            }),
        }
    }
}

/// Parse a comma-separated location feed.
///
/// The first non-blank line is the header. Blank lines are ignored; every
/// other line becomes either a record or a [`SkippedRow`]. A leading UTF-8
/// byte-order mark is dropped.
pub fn parse_feed(text: &str) -> Result<ParsedFeed, FeedFormatError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or(FeedFormatError::MissingHeader)?;
    let columns = FeedColumns::from_header(header)?;

    let mut parsed = ParsedFeed::default();
    for (line, row) in lines {
        let cells = split_feed_line(row);
        match parse_row(&cells, &columns) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => parsed.skipped.push(SkippedRow { line, reason }),
        }
    }
    Ok(parsed)
}

/// Split one line into cells.
///
/// A `"` toggles quoted mode, `""` inside quoted mode is a literal quote, and
/// commas only separate cells outside quoted mode.
pub fn split_feed_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    cells.push(current);
    cells
}

fn parse_row(cells: &[String], columns: &FeedColumns) -> Result<LocationRecord, SkipReason> {
    if cells.len() < REQUIRED_COLUMNS.len() {
        return Err(SkipReason::TooFewCells { cells: cells.len() });
    }

    let name = cell(cells, Some(columns.name)).unwrap_or("");
    if name.is_empty() {
        return Err(SkipReason::MissingName);
    }
    let x = parse_coordinate(cell(cells, Some(columns.x)), Axis::X)?;
    let z = parse_coordinate(cell(cells, Some(columns.z)), Axis::Z)?;

    Ok(LocationRecord {
        name: name.to_string(),
        x,
        z,
        category: tag(cell(cells, columns.category), DEFAULT_CATEGORY),
        dimension: tag(cell(cells, columns.dimension), DEFAULT_DIMENSION),
        notes: cell(cells, columns.notes).unwrap_or("").to_string(),
    })
}

fn cell(cells: &[String], index: Option<usize>) -> Option<&str> {
    index
        .and_then(|index| cells.get(index))
        .map(|value| value.trim())
}

fn tag(value: Option<&str>, default: &str) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_lowercase(),
        _ => default.to_string(),
    }
}

fn parse_coordinate(value: Option<&str>, axis: Axis) -> Result<i64, SkipReason> {
    let value = value.unwrap_or("");
    value
        .parse::<i64>()
        .map_err(|_| SkipReason::InvalidCoordinate {
            axis,
            value: value.to_string(),
        })
}
