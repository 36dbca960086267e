use crate::interval::Interval;

/// Check whether a sequence is in ascending order.
/// Sequences with fewer than two elements are trivially sorted.
pub fn is_sorted<T: PartialOrd>(vals: &[T]) -> bool {
    !vals.windows(2).any(|w| w[0] > w[1])
}

/// Check whether intervals are in ascending order of start coordinate.
pub fn is_sorted_by_start(intervals: &[Interval]) -> bool {
    !intervals.windows(2).any(|w| w[0].start() > w[1].start())
}
