//! Input/output helpers.
//!
//! - CSV/workbook ingest + validation (`ingest`)
//! - filtered table export (`export`)
//! - JSON report read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
