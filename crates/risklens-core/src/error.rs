//! Register error types.
//!
//! Every fallible operation in this crate surfaces errors through
//! [`RegisterError`]. Each variant carries enough context for callers to
//! report the failure without inspecting opaque strings: loader errors name
//! the offending row and column, expression errors name the column and the
//! rule that was broken.

/// Unified error type for the risk register data model.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    // -- Loader errors ------------------------------------------------------
    /// A schema column is absent from the CSV header row.
    #[error("register is missing required column `{column}`")]
    MissingColumn { column: String },

    /// The CSV header row names a column the schema does not define.
    #[error("register contains unexpected column `{column}`")]
    UnexpectedColumn { column: String },

    /// A cell could not be parsed as the kind its column requires.
    /// `row` is 1-based and counts the header row, matching what a user
    /// sees in a spreadsheet.
    #[error("row {row}, column `{column}`: cannot read {value:?} as {expected}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    // -- Expression errors --------------------------------------------------
    /// An expression references a column that is not in the schema.
    #[error("filter references unknown column `{column}`")]
    UnknownColumn { column: String },

    /// A comparison supplies a literal whose type does not match the column.
    #[error("column `{column}` holds {expected} values but the filter supplies a {found} operand")]
    OperandMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An ordering operator was applied to a column that has no ordering.
    #[error("ordering comparison is not defined for boolean column `{column}`")]
    UnorderedColumn { column: String },

    /// A containment predicate targets a non-text column.
    #[error("containment requires a text column, but `{column}` holds {kind} values")]
    NonTextContains { column: String, kind: &'static str },

    /// An `and`/`or` node has no clauses. An empty clause list would match
    /// everything or nothing by accident, so it is rejected outright.
    #[error("filter contains an `{kind}` node with no clauses")]
    EmptyClauses { kind: &'static str },

    // -- Underlying errors --------------------------------------------------
    /// CSV parse error from the `csv` crate (ragged rows, bad quoting).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while reading the register file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the data-model crate.
pub type Result<T> = std::result::Result<T, RegisterError>;
