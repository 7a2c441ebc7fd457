//! Reporting utilities: formatted terminal output for KPIs and tables.

pub mod format;

pub use format::*;
