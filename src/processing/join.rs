//! Joining many ranges into the smallest set of disjoint ranges.

use crate::models::SequentialRange;
use itertools::Itertools;

/// Merge overlapping and adjacent ranges.
///
/// The result is sorted by version then lower bound. No two ranges in it
/// overlap or touch. Ranges of different versions are never merged.
pub fn join(ranges: &[SequentialRange]) -> Vec<SequentialRange> {
    log::trace!("join({} ranges)", ranges.len());
    let mut joined: Vec<SequentialRange> = Vec::with_capacity(ranges.len());
    for range in ranges.iter().sorted() {
        match joined.last_mut() {
            Some(last) if last.is_adjacent_or_overlapping(range) => {
                if range.upper_value() > last.upper_value() {
                    *last = SequentialRange::from_values(
                        last.version(),
                        last.lower_value(),
                        range.upper_value(),
                    );
                }
            }
            _ => joined.push(range.clone()),
        }
    }
    log::debug!("joined {} ranges into {}", ranges.len(), joined.len());
    joined
}

impl SequentialRange {
    /// See [`join`].
    pub fn join(ranges: &[SequentialRange]) -> Vec<SequentialRange> {
        join(ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IpVersion;
    use pretty_assertions::assert_eq;

    fn r(lo: u128, hi: u128) -> SequentialRange {
        SequentialRange::from_value_range(IpVersion::V4, lo, hi).unwrap()
    }

    #[test]
    fn test_join_merges_overlap_and_adjacency() {
        let got = join(&[r(10, 20), r(1, 5), r(6, 8), r(15, 30), r(40, 40)]);
        assert_eq!(got, vec![r(1, 8), r(10, 30), r(40, 40)]);
    }

    #[test]
    fn test_join_is_idempotent() {
        let once = join(&[r(5, 9), r(1, 2), r(3, 3), r(20, 25), r(22, 23)]);
        assert_eq!(join(&once), once);
    }

    #[test]
    fn test_join_keeps_versions_apart() {
        let v6 = SequentialRange::from_value_range(IpVersion::V6, 0, 10).unwrap();
        let got = join(&[v6.clone(), r(0, 10)]);
        assert_eq!(got, vec![r(0, 10), v6]);
    }

    #[test]
    fn test_join_contained_and_empty() {
        assert_eq!(join(&[r(1, 100), r(5, 6)]), vec![r(1, 100)]);
        assert!(join(&[]).is_empty());
        let top = SequentialRange::from_value_range(IpVersion::V6, u128::MAX, u128::MAX).unwrap();
        let below = SequentialRange::from_value_range(IpVersion::V6, 0, u128::MAX - 1).unwrap();
        let got = join(&[top, below]);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].upper_value(), u128::MAX);
    }
}
