//! Restricted filter expressions.
//!
//! A [`FilterExpr`] is the only way a generated filter can touch the
//! register. The grammar is deliberately small: comparisons against a
//! literal, substring containment, and `and`/`or` composition. There is no
//! code, no function calls and no access to anything outside the row being
//! tested, so a hostile or confused model response can at worst produce a
//! filter that matches the wrong rows.
//!
//! Expressions arrive as JSON from the filter generator:
//!
//! ```json
//! {"type": "and", "clauses": [
//!   {"type": "compare", "column": "Risk Type - Reputational", "op": "eq", "value": true},
//!   {"type": "contains", "column": "Contract:Region", "value": "north"}
//! ]}
//! ```
//!
//! Every expression is validated against the fixed schema before it is
//! evaluated. Evaluation itself is infallible: a `Null` cell simply never
//! matches, whatever the predicate.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{RegisterError, Result};
use crate::register::{Row, Value};
use crate::schema::{self, ColumnKind};

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// Comparison operator for [`FilterExpr::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// True for the four operators that need an ordered column.
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    fn admits(&self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
        }
    }
}

/// A literal operand. The JSON scalar type decides the variant, so `true`,
/// `20` and `"Open"` arrive as bool, number and text respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Literal {
    fn kind_str(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
        }
    }
}

/// A schema-bound predicate over register rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterExpr {
    /// Compare one column against a literal.
    Compare {
        column: String,
        op: CompareOp,
        value: Literal,
    },
    /// Substring containment on a text column. Case-insensitive unless
    /// `case_sensitive` is set, mirroring how people phrase these queries.
    Contains {
        column: String,
        value: String,
        #[serde(default)]
        case_sensitive: bool,
    },
    /// All clauses must match.
    And { clauses: Vec<FilterExpr> },
    /// At least one clause must match.
    Or { clauses: Vec<FilterExpr> },
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl FilterExpr {
    /// Check the expression against the register schema.
    ///
    /// Rules, applied recursively:
    /// - every referenced column must exist in the schema;
    /// - a comparison literal must have the column's kind;
    /// - ordering operators (`lt`, `le`, `gt`, `ge`) need a text or number
    ///   column;
    /// - containment needs a text column;
    /// - `and`/`or` need at least one clause.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Compare { column, op, value } => {
                let col = schema::find(column).ok_or_else(|| RegisterError::UnknownColumn {
                    column: column.clone(),
                })?;
                let kind_matches = matches!(
                    (col.kind, value),
                    (ColumnKind::Text, Literal::Text(_))
                        | (ColumnKind::Bool, Literal::Bool(_))
                        | (ColumnKind::Number, Literal::Number(_))
                );
                if !kind_matches {
                    return Err(RegisterError::OperandMismatch {
                        column: column.clone(),
                        expected: col.kind.as_str(),
                        found: value.kind_str(),
                    });
                }
                if op.is_ordering() && col.kind == ColumnKind::Bool {
                    return Err(RegisterError::UnorderedColumn {
                        column: column.clone(),
                    });
                }
                Ok(())
            }
            Self::Contains { column, .. } => {
                let col = schema::find(column).ok_or_else(|| RegisterError::UnknownColumn {
                    column: column.clone(),
                })?;
                if col.kind != ColumnKind::Text {
                    return Err(RegisterError::NonTextContains {
                        column: column.clone(),
                        kind: col.kind.as_str(),
                    });
                }
                Ok(())
            }
            Self::And { clauses } | Self::Or { clauses } => {
                if clauses.is_empty() {
                    return Err(RegisterError::EmptyClauses {
                        kind: self.kind_name(),
                    });
                }
                clauses.iter().try_for_each(Self::validate)
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Compare { .. } => "compare",
            Self::Contains { .. } => "contains",
            Self::And { .. } => "and",
            Self::Or { .. } => "or",
        }
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    /// Does this row satisfy the expression?
    ///
    /// Callers are expected to [`validate`](Self::validate) first; an
    /// expression that refers to a column this row does not carry simply
    /// fails to match.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Self::Compare { column, op, value } => row
                .cell(column)
                .is_some_and(|cell| compare_cell(cell, *op, value)),
            Self::Contains {
                column,
                value,
                case_sensitive,
            } => row
                .cell(column)
                .is_some_and(|cell| cell_contains(cell, value, *case_sensitive)),
            Self::And { clauses } => clauses.iter().all(|clause| clause.matches(row)),
            Self::Or { clauses } => clauses.iter().any(|clause| clause.matches(row)),
        }
    }
}

fn compare_cell(cell: &Value, op: CompareOp, literal: &Literal) -> bool {
    match (cell, literal) {
        (Value::Bool(have), Literal::Bool(want)) => match op {
            CompareOp::Eq => have == want,
            CompareOp::Ne => have != want,
            _ => false,
        },
        (Value::Number(have), Literal::Number(want)) => {
            have.partial_cmp(want).is_some_and(|ord| op.admits(ord))
        }
        // Text comparison is plain byte order. Dates are yyyy-mm-dd, so
        // this is also chronological order for them.
        (Value::Text(have), Literal::Text(want)) => op.admits(have.as_str().cmp(want.as_str())),
        // Null cells, and any cell/literal kind drift, never match.
        _ => false,
    }
}

fn cell_contains(cell: &Value, needle: &str, case_sensitive: bool) -> bool {
    match cell {
        Value::Text(haystack) if case_sensitive => haystack.contains(needle),
        Value::Text(haystack) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        _ => false,
    }
}
