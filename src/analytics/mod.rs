//! Filtering and aggregation over loaded records.
//!
//! Everything here is pure: inputs are borrowed, outputs are freshly built, and
//! nothing is cached between calls.

pub mod filter;
pub mod metrics;

pub use filter::filter_by_range;
pub use metrics::*;
