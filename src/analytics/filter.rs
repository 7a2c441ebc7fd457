//! Date-range filtering.

use crate::domain::{DateRange, RecordSet};

/// Keep the records with `range.start <= date <= range.end`, in order.
///
/// An inverted range (`start > end`) yields an empty set rather than an error.
pub fn filter_by_range(records: &RecordSet, range: &DateRange) -> RecordSet {
    if range.is_inverted() {
        return RecordSet::default();
    }

    let kept = records
        .iter()
        .filter(|r| range.contains(r.date))
        .copied()
        .collect();
    RecordSet::from_sorted(kept)
}
