//! In-memory risk register.
//!
//! A [`RiskRegister`] is an ordered list of rows loaded from a CSV export of
//! the corporate risk spreadsheet. Cells are parsed once at load time into
//! typed [`Value`]s according to the fixed [`crate::schema`]; a cell that
//! cannot be parsed fails the whole load with the offending row and column
//! named, so a malformed register never reaches the query pipeline.
//!
//! Filtering never mutates a register. [`RiskRegister::filtered`] returns an
//! independent copy of the matching rows, so the source register can serve
//! any number of queries concurrently.

use std::io::Read;
use std::path::Path;

use crate::error::{RegisterError, Result};
use crate::expr::FilterExpr;
use crate::schema::{self, Column, ColumnKind};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single typed cell.
///
/// `Null` marks an empty cell. Null cells never satisfy any filter
/// predicate, including negative ones: a row whose `Status` is missing is
/// excluded both by `Status eq "Open"` and by `Status ne "Open"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty cell.
    Null,
    /// A yes/no flag.
    Bool(bool),
    /// A numeric score or monetary amount. Always finite.
    Number(f64),
    /// Free text, including `yyyy-mm-dd` dates.
    Text(String),
}

impl Value {
    /// True when the cell is empty.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert to a plain JSON scalar for model payloads.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(t) => serde_json::Value::String(t.clone()),
        }
    }
}

impl std::fmt::Display for Value {
    /// Canonical text form. Null renders as the empty string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One register entry. Cells are stored in canonical schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Value>,
}

impl Row {
    pub(crate) fn new(cells: Vec<Value>) -> Self {
        Self { cells }
    }

    /// Cell value for a named column, or `None` if the name is not in the
    /// schema.
    pub fn cell(&self, column: &str) -> Option<&Value> {
        schema::index_of(column).and_then(|i| self.cells.get(i))
    }

    /// The row as a JSON object mapping column names to scalars.
    pub fn record(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (col, cell) in schema::COLUMNS.iter().zip(&self.cells) {
            map.insert(col.name.to_string(), cell.to_json());
        }
        serde_json::Value::Object(map)
    }
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// The loaded risk register, or a filtered subset of one.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRegister {
    rows: Vec<Row>,
}

impl RiskRegister {
    /// Load a register from a CSV file on disk.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let register = Self::from_csv_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = register.len(),
            "risk register loaded"
        );
        Ok(register)
    }

    /// Load a register from any CSV source.
    ///
    /// The header row must name exactly the schema columns, in any order;
    /// cells are mapped to columns by name, not by position. Missing,
    /// unknown and duplicated headers are all rejected.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = csv.headers()?.clone();

        for (i, header) in headers.iter().enumerate() {
            if schema::find(header).is_none() || headers.iter().take(i).any(|prev| prev == header)
            {
                return Err(RegisterError::UnexpectedColumn {
                    column: header.to_string(),
                });
            }
        }
        let mut positions = Vec::with_capacity(schema::COLUMNS.len());
        for col in schema::COLUMNS {
            match headers.iter().position(|h| h == col.name) {
                Some(pos) => positions.push(pos),
                None => {
                    return Err(RegisterError::MissingColumn {
                        column: col.name.to_string(),
                    });
                }
            }
        }

        let mut rows = Vec::new();
        for (i, record) in csv.records().enumerate() {
            let record = record?;
            // 1-based and counting the header row, so it matches the line a
            // user sees when they open the file in a spreadsheet.
            let row_number = i + 2;
            let mut cells = Vec::with_capacity(schema::COLUMNS.len());
            for (col, pos) in schema::COLUMNS.iter().zip(&positions) {
                let raw = record.get(*pos).unwrap_or("");
                cells.push(parse_cell(raw, col, row_number)?);
            }
            rows.push(Row::new(cells));
        }

        Ok(Self { rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the register holds no rows. An empty register is valid;
    /// downstream stages decide what emptiness means for them.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in load order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Every row as a JSON object, for model payloads.
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.rows.iter().map(Row::record).collect()
    }

    /// Validate `filter` against the schema, then copy out the matching
    /// rows as a new register. The source register is untouched, and the
    /// same filter applied again yields the same subset.
    pub fn filtered(&self, filter: &FilterExpr) -> Result<RiskRegister> {
        filter.validate()?;
        let rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        tracing::debug!(matched = rows.len(), total = self.rows.len(), "filter applied");
        Ok(RiskRegister { rows })
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

fn parse_cell(raw: &str, column: &Column, row: usize) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    let invalid = || RegisterError::InvalidCell {
        row,
        column: column.name.to_string(),
        value: raw.to_string(),
        expected: column.kind.as_str(),
    };
    match column.kind {
        ColumnKind::Text => Ok(Value::Text(trimmed.to_string())),
        ColumnKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        ColumnKind::Number => match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(invalid()),
        },
    }
}
