//! Gap finding inside a containing range.
//!
//! Identifies the unused address ranges of a container given the ranges
//! already allocated within it.

use super::join::join;
use crate::models::{Address, SequentialRange};

/// One free range of the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapRow {
    /// The free range.
    pub range: SequentialRange,
    /// The same range as the fewest prefix blocks.
    pub blocks: Vec<Address>,
}

/// Find the free ranges of `container` not covered by any range in `used`.
///
/// Used ranges of another version, or outside the container, are ignored.
/// The gaps come back in ascending order.
pub fn find_gaps(container: &SequentialRange, used: &[SequentialRange]) -> Vec<GapRow> {
    let inside: Vec<SequentialRange> = used
        .iter()
        .filter_map(|range| {
            let clipped = range.intersect(container);
            if clipped.is_none() {
                log::debug!("ignoring {range}: outside {container}");
            }
            clipped
        })
        .collect();
    let allocated = join(&inside);
    log::debug!(
        "find_gaps({container}) with {} allocated ranges",
        allocated.len()
    );

    let version = container.version();
    let mut rows = Vec::new();
    let mut push_gap = |lower: u128, upper: u128| {
        let range = SequentialRange::from_values(version, lower, upper);
        let blocks = range.span_with_prefix_blocks();
        log::trace!("gap {range} as {} blocks", blocks.len());
        rows.push(GapRow { range, blocks });
    };

    // Look for unused ranges between allocations
    let mut next = Some(container.lower_value());
    for range in &allocated {
        let Some(start) = next else {
            break;
        };
        if start < range.lower_value() {
            push_gap(start, range.lower_value() - 1);
        }
        next = range.upper_value().checked_add(1);
    }
    if let Some(start) = next {
        if start <= container.upper_value() {
            push_gap(start, container.upper_value());
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IpVersion;
    use num_bigint::BigUint;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    fn range(lo: Ipv4Addr, hi: Ipv4Addr) -> SequentialRange {
        SequentialRange::new(&Address::from(lo), &Address::from(hi)).unwrap()
    }

    fn block(cidr: &str) -> SequentialRange {
        let (addr, prefix) = cidr.split_once('/').unwrap();
        let addr = Address::from(addr.parse::<Ipv4Addr>().unwrap())
            .to_prefix_block_len(prefix.parse().unwrap())
            .unwrap();
        SequentialRange::from_section(addr.section())
    }

    #[test]
    fn test_find_gaps_between_subnets() {
        let container = block("10.0.0.0/16");
        let used = vec![block("10.0.1.0/24"), block("10.0.0.0/25"), block("10.0.2.0/23")];
        let gaps = find_gaps(&container, &used);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].range, block("10.0.0.128/25"));
        assert_eq!(gaps[1].range, range(Ipv4Addr::new(10, 0, 4, 0), Ipv4Addr::new(10, 0, 255, 255)));
        let blocks: Vec<String> = gaps[1].blocks.iter().map(ToString::to_string).collect();
        assert_eq!(
            blocks,
            vec!["10.0.4.0/22", "10.0.8.0/21", "10.0.16.0/20", "10.0.32.0/19", "10.0.64.0/18", "10.0.128.0/17"]
        );
    }

    #[test]
    fn test_find_gaps_alignment() {
        // free space starting at 10.6.2.80 can only begin with a /28
        let container = block("10.6.0.0/20");
        let used = vec![
            range(Ipv4Addr::new(10, 6, 0, 0), Ipv4Addr::new(10, 6, 2, 79)),
            block("10.6.8.0/21"),
        ];
        let gaps = find_gaps(&container, &used);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].blocks[0].to_string(), "10.6.2.80/28");
        assert!(gaps[0].blocks.iter().all(|b| b.upper_value() < 0x0A060800));
    }

    #[test]
    fn test_gaps_and_used_cover_container() {
        let container = block("192.168.0.0/24");
        let used = vec![
            range(Ipv4Addr::new(192, 168, 0, 3), Ipv4Addr::new(192, 168, 0, 9)),
            range(Ipv4Addr::new(192, 168, 0, 200), Ipv4Addr::new(192, 168, 1, 10)),
            range(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(10, 0, 0, 5)),
        ];
        let gaps = find_gaps(&container, &used);
        let mut all: Vec<SequentialRange> = gaps.iter().map(|g| g.range.clone()).collect();
        all.extend(used.iter().filter_map(|u| u.intersect(&container)));
        assert_eq!(join(&all), vec![container.clone()]);
        let free: BigUint = gaps.iter().map(|g| g.range.count()).sum();
        assert_eq!(free, BigUint::from(256u32 - 7 - 56));
    }

    #[test]
    fn test_no_used_and_fully_used() {
        let container = block("10.0.0.0/30");
        assert_eq!(find_gaps(&container, &[]).len(), 1);
        assert!(find_gaps(&container, &[block("10.0.0.0/29")]).is_empty());

        let all = SequentialRange::from_value_range(IpVersion::V6, 0, u128::MAX).unwrap();
        let top = SequentialRange::from_value_range(IpVersion::V6, 1 << 127, u128::MAX).unwrap();
        let gaps = find_gaps(&all, &[top]);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].blocks.len(), 1);
        assert_eq!(gaps[0].blocks[0].prefix_len(), Some(1));
    }
}
