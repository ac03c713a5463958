//! Fixed schema of the corporate risk register.
//!
//! Every register carries exactly these 45 columns, in this order. The
//! schema is the contract between the CSV loader, the filter validator and
//! the language model that generates filters: a column name that is not
//! listed here is rejected everywhere.
//!
//! Date columns (`Date Raised`, `Date Updated`, `By When`) hold plain
//! `yyyy-mm-dd` text. They are never parsed into calendar types; the format
//! sorts lexically, so ordinary string comparison gives chronological order.

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The kind of scalar a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text, including the `yyyy-mm-dd` date columns.
    Text,
    /// A yes/no flag.
    Bool,
    /// A numeric score or monetary amount.
    Number,
}

impl ColumnKind {
    /// Human-readable kind name used in error messages and prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bool => "boolean",
            Self::Number => "number",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named column in the register schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Exact header text as it appears in the source spreadsheet.
    pub name: &'static str,
    /// What the column's cells hold.
    pub kind: ColumnKind,
}

// ---------------------------------------------------------------------------
// The schema
// ---------------------------------------------------------------------------

use ColumnKind::{Bool, Number, Text};

/// All register columns, in canonical order.
pub const COLUMNS: &[Column] = &[
    Column { name: "Risk Area", kind: Text },
    Column { name: "Date Raised", kind: Text },
    Column { name: "Contract", kind: Text },
    Column { name: "Contract:Region", kind: Text },
    Column { name: "Date Updated", kind: Text },
    Column { name: "RiskIDNumber", kind: Text },
    Column { name: "Raised By", kind: Text },
    Column { name: "Risk/Opportunity", kind: Text },
    Column { name: "Description of Risk/Opportunity", kind: Text },
    Column { name: "Risk Type - Financial", kind: Bool },
    Column { name: "Risk Type - Commercial/Contractual", kind: Bool },
    Column { name: "Risk Type - Reputational", kind: Bool },
    Column { name: "Risk Type - People", kind: Bool },
    Column { name: "Risk Type - Regulatory and Law", kind: Bool },
    Column { name: "Risk Type - SHE", kind: Bool },
    Column { name: "Probability - Pre Mitigation - Likelihood", kind: Number },
    Column { name: "Probability - Pre Mitigation - Impact", kind: Number },
    Column { name: "Probability - Pre Mitigation - Score (out of 25)", kind: Number },
    Column { name: "Probability - Pre Mitigation - % Risk Score", kind: Number },
    Column { name: "Impact (£) - Worst Case (Unmitigated)", kind: Number },
    Column { name: "Impact (£) - Best Case", kind: Number },
    Column { name: "Impact (£) - Expected", kind: Number },
    Column { name: "Sum of Financial Year Impacts", kind: Number },
    Column { name: "Status", kind: Text },
    Column { name: "Risk Owner", kind: Text },
    Column { name: "Control Measure / Mitigation", kind: Text },
    Column { name: "By When", kind: Text },
    Column { name: "Probability - Post Mitigation - Likelihood", kind: Number },
    Column { name: "Probability - Post Mitigation - Impact", kind: Number },
    Column { name: "Probability - Post Mitigation - Score (out of 25)", kind: Number },
    Column { name: "Probability - Post Mitigation - % Risk Score", kind: Number },
    Column { name: "Risk Paper", kind: Text },
    Column { name: "Contract Manager", kind: Text },
    Column { name: "Regional Manager", kind: Text },
    Column { name: "Expected Impact FY 23-24", kind: Number },
    Column { name: "Accounting Treatment FY 23-24", kind: Text },
    Column { name: "Expected Impact FY 24-25", kind: Number },
    Column { name: "Accounting Treatment FY 24-25", kind: Text },
    Column { name: "Expected Impact FY 25-26", kind: Number },
    Column { name: "Accounting Treatment FY 25-26", kind: Text },
    Column { name: "Expected Impact FY 26-27", kind: Number },
    Column { name: "Accounting Treatment FY 26-27", kind: Text },
    Column { name: "Expected Impact FY 27-28", kind: Number },
    Column { name: "Accounting Treatment FY 27-28", kind: Text },
    Column { name: "OriginList", kind: Text },
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Look up a column by its exact name.
pub fn find(name: &str) -> Option<&'static Column> {
    COLUMNS.iter().find(|c| c.name == name)
}

/// Position of a column in the canonical order.
///
/// Rows store their cells in this order, so the returned index addresses
/// the matching cell in any [`crate::register::Row`].
pub fn index_of(name: &str) -> Option<usize> {
    COLUMNS.iter().position(|c| c.name == name)
}

/// Iterator over all column names in canonical order.
pub fn column_names() -> impl Iterator<Item = &'static str> {
    COLUMNS.iter().map(|c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_forty_five_columns() {
        assert_eq!(COLUMNS.len(), 45);
    }

    #[test]
    fn column_names_are_unique() {
        for (i, col) in COLUMNS.iter().enumerate() {
            assert_eq!(
                index_of(col.name),
                Some(i),
                "duplicate or misordered column {}",
                col.name
            );
        }
    }

    #[test]
    fn lookup_is_exact_match_only() {
        assert!(find("Status").is_some());
        assert!(find("status").is_none());
        assert!(find("Status ").is_none());
        assert!(find("Shoe Size").is_none());
    }

    #[test]
    fn risk_type_flags_are_boolean() {
        for col in COLUMNS.iter().filter(|c| c.name.starts_with("Risk Type - ")) {
            assert_eq!(col.kind, ColumnKind::Bool, "{}", col.name);
        }
    }

    #[test]
    fn scores_and_impacts_are_numeric() {
        for name in [
            "Probability - Pre Mitigation - Score (out of 25)",
            "Probability - Post Mitigation - % Risk Score",
            "Impact (£) - Expected",
            "Sum of Financial Year Impacts",
            "Expected Impact FY 27-28",
        ] {
            assert_eq!(find(name).map(|c| c.kind), Some(ColumnKind::Number), "{name}");
        }
    }

    #[test]
    fn dates_are_plain_text() {
        for name in ["Date Raised", "Date Updated", "By When"] {
            assert_eq!(find(name).map(|c| c.kind), Some(ColumnKind::Text), "{name}");
        }
    }
}
