//! Risk register data model for RiskLens.
//!
//! This crate owns everything that touches register data directly: the fixed
//! 45-column schema, CSV loading into typed rows, and the restricted filter
//! expression language that generated filters must be written in. It knows
//! nothing about language models; the `risklens-agent` crate layers the
//! query pipeline on top.
//!
//! # Modules
//!
//! - [`schema`] -- the fixed column set and kind lookups.
//! - [`register`] -- typed rows, CSV loading, JSON records, subset copies.
//! - [`expr`] -- the restricted filter grammar, validation and evaluation.
//! - [`error`] -- unified error type.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use risklens_core::{FilterExpr, RiskRegister};
//!
//! # fn example() -> risklens_core::Result<()> {
//! let register = RiskRegister::from_csv_path(Path::new("data/risk_register.csv"))?;
//!
//! let filter: FilterExpr = serde_json::from_str(
//!     r#"{"type": "compare", "column": "Status", "op": "eq", "value": "Open"}"#,
//! ).unwrap();
//!
//! let open_risks = register.filtered(&filter)?;
//! println!("{} of {} risks are open", open_risks.len(), register.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod expr;
pub mod register;
pub mod schema;

// Re-export the most commonly used types at the crate root for convenience.
pub use error::{RegisterError, Result};
pub use expr::{CompareOp, FilterExpr, Literal};
pub use register::{RiskRegister, Row, Value};
pub use schema::{COLUMNS, Column, ColumnKind};
