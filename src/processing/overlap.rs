//! Overlap detection across a list of ranges.

use crate::models::SequentialRange;
use itertools::Itertools;

/// Two input ranges sharing at least one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapConflict {
    /// Index of the earlier input.
    pub first_index: usize,
    /// Index of the later input.
    pub second_index: usize,
    pub first: SequentialRange,
    pub second: SequentialRange,
    /// The shared addresses.
    pub overlap: SequentialRange,
}

/// Find every pair of ranges that overlap.
///
/// Conflicts are sorted by overlapping range, then by input indices.
pub fn find_overlaps(ranges: &[SequentialRange]) -> Vec<OverlapConflict> {
    let order: Vec<usize> = (0..ranges.len())
        .sorted_by(|&a, &b| ranges[a].cmp(&ranges[b]))
        .collect();

    let mut conflicts = Vec::new();
    for (pos, &i) in order.iter().enumerate() {
        // sorted by lower bound: stop at the first later range starting past this one
        for &j in &order[pos + 1..] {
            let (a, b) = (&ranges[i], &ranges[j]);
            if b.version() != a.version() || b.lower_value() > a.upper_value() {
                break;
            }
            if let Some(overlap) = a.intersect(b) {
                let (first_index, second_index) = (i.min(j), i.max(j));
                conflicts.push(OverlapConflict {
                    first_index,
                    second_index,
                    first: ranges[first_index].clone(),
                    second: ranges[second_index].clone(),
                    overlap,
                });
            }
        }
    }

    // Sort by overlap for consistent output
    conflicts.sort_by(|a, b| {
        a.overlap
            .cmp(&b.overlap)
            .then(a.first_index.cmp(&b.first_index))
            .then(a.second_index.cmp(&b.second_index))
    });
    conflicts
}

/// Log overlapping ranges as warnings.
pub fn log_overlaps(conflicts: &[OverlapConflict]) {
    if conflicts.is_empty() {
        log::info!("No overlapping ranges found.");
        return;
    }

    log::warn!("Found {} overlapping range pair(s):", conflicts.len());

    for conflict in conflicts {
        log::warn!(
            "  #{} [{}] and #{} [{}] share {} ({} addresses)",
            conflict.first_index,
            conflict.first,
            conflict.second_index,
            conflict.second,
            conflict.overlap,
            conflict.overlap.count()
        );
    }
}
