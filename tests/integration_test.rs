//! Integration tests for subnet-algebra
//!
//! These tests drive the public API the way a caller would, from building
//! sections through set operations, spans and the summary tooling.

use num_bigint::BigUint;
use pretty_assertions::assert_eq;
use std::net::{Ipv4Addr, Ipv6Addr};
use subnet_algebra::input::parse_ranges;
use subnet_algebra::models::SegInt;
use subnet_algebra::{
    find_gaps, find_overlaps, join, merge_to_prefix_blocks, Address, AddressError, IpVersion,
    Section, SequentialRange,
};

fn v4(ranges: &[(SegInt, SegInt)]) -> Section {
    Section::from_ranges(IpVersion::V4, ranges, None).expect("valid section")
}

fn tuples(section: &Section) -> Vec<Vec<SegInt>> {
    section
        .iter()
        .map(|s| s.segments().iter().map(|seg| seg.lower()).collect())
        .collect()
}

#[test]
fn test_enumeration_order() {
    let last_varies = v4(&[(1, 1), (2, 2), (3, 3), (10, 12)]);
    let lasts: Vec<SegInt> = tuples(&last_varies).iter().map(|t| t[3]).collect();
    assert_eq!(lasts, vec![10, 11, 12]);

    let two = v4(&[(1, 2), (5, 6), (0, 0), (0, 0)]);
    let pairs: Vec<(SegInt, SegInt)> = tuples(&two).iter().map(|t| (t[0], t[1])).collect();
    assert_eq!(pairs, vec![(1, 5), (1, 6), (2, 5), (2, 6)]);
}

#[test]
fn test_block_mask_prefix_len() {
    let ones = Section::from_value(IpVersion::V4, 0xFFFF_FFFF, None).unwrap();
    let zeros = Section::from_value(IpVersion::V4, 0, None).unwrap();
    let mixed = Section::from_value(IpVersion::V4, 0xFF00_FF00, None).unwrap();
    assert_eq!(ones.block_mask_prefix_len(true), Some(32));
    assert_eq!(zeros.block_mask_prefix_len(true), Some(0));
    assert_eq!(mixed.block_mask_prefix_len(true), None);

    let v6_ones = Section::from_value(IpVersion::V6, u128::MAX, None).unwrap();
    assert_eq!(v6_ones.block_mask_prefix_len(true), Some(128));
}

#[test]
fn test_subtract_disjoint_is_identity() {
    let a = v4(&[(10, 10), (0, 0), (0, 3), (0, 255)]);
    let b = v4(&[(10, 10), (0, 0), (8, 9), (0, 255)]);
    assert_eq!(a.subtract(&b).unwrap(), vec![a.clone()]);
    assert_eq!(a.intersect(&b).unwrap(), None);

    let v6 = Section::from_value(IpVersion::V6, 1, None).unwrap();
    assert!(matches!(
        a.subtract(&v6),
        Err(AddressError::SizeMismatch { expected: 4, actual: 8 })
    ));
}

#[test]
fn test_subtract_then_span_rebuilds_remainder() {
    let block = Address::from(Ipv4Addr::new(192, 168, 0, 0))
        .to_prefix_block_len(22)
        .unwrap();
    let hole = Address::from(Ipv4Addr::new(192, 168, 1, 7));
    let rest = block.subtract(&hole).unwrap();

    let ranges: Vec<SequentialRange> = rest
        .iter()
        .flat_map(|a| a.span_with_sequential_blocks())
        .map(|a| SequentialRange::from_section(a.section()))
        .collect();
    let joined = join(&ranges);
    assert_eq!(joined.len(), 2);
    assert_eq!(joined[0].upper().to_string(), "192.168.1.6");
    assert_eq!(joined[1].lower().to_string(), "192.168.1.8");
    let total: BigUint = joined.iter().map(|r| r.count()).sum();
    assert_eq!(total, BigUint::from(1023u32));
}

#[test]
fn test_merge_and_cover() {
    let addrs: Vec<Address> = ["10.0.0.4/30", "10.0.0.0/30", "10.0.0.8/29", "10.0.1.0/24"]
        .iter()
        .map(|s| {
            let (ip, p) = s.split_once('/').unwrap();
            Address::from(ip.parse::<Ipv4Addr>().unwrap())
                .to_prefix_block_len(p.parse().unwrap())
                .unwrap()
        })
        .collect();
    let merged: Vec<String> = merge_to_prefix_blocks(&addrs)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(merged, vec!["10.0.0.0/28", "10.0.1.0/24"]);

    let cover = addrs[1].cover_with_prefix_block_to(&addrs[3]).unwrap();
    assert_eq!(cover.to_string(), "10.0.0.0/23");
}

#[test]
fn test_ipv6_prefix_iteration() {
    let block = Address::from("2001:db8::".parse::<Ipv6Addr>().unwrap())
        .to_prefix_block_len(62)
        .unwrap();
    let subnets: Vec<String> = block.prefix_block_iter(64).map(|a| a.to_string()).collect();
    assert_eq!(
        subnets,
        vec!["2001:db8::/64", "2001:db8:0:1::/64", "2001:db8:0:2::/64", "2001:db8:0:3::/64"]
    );
    assert_eq!(block.to_ipv6_addr(), None);
    assert_eq!(
        block.lower().to_ipv6_addr(),
        Some("2001:db8::".parse::<Ipv6Addr>().unwrap())
    );
}

#[test]
fn test_summary_workflow() {
    let ranges = parse_ranges(
        "# allocated\n\
         10.1.0.0/24\n\
         10.1.1.0/25\n\
         10.1.0.128-10.1.0.200   # overlaps the first\n\
         10.1.4.0/22\n",
    )
    .expect("Failed to parse ranges");
    assert_eq!(ranges.len(), 4);

    let conflicts = find_overlaps(&ranges);
    assert_eq!(conflicts.len(), 1);
    assert_eq!((conflicts[0].first_index, conflicts[0].second_index), (0, 2));

    let joined = join(&ranges);
    assert_eq!(joined.len(), 2);

    let container = SequentialRange::from_section(
        Address::from(Ipv4Addr::new(10, 1, 0, 0))
            .to_prefix_block_len(21)
            .unwrap()
            .section(),
    );
    let gaps = find_gaps(&container, &ranges);
    let blocks: Vec<String> = gaps
        .iter()
        .flat_map(|g| g.blocks.iter().map(ToString::to_string))
        .collect();
    assert_eq!(blocks, vec!["10.1.1.128/25", "10.1.2.0/23"]);
}
