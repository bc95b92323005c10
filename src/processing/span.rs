//! Spanning and covering ranges with blocks, and merging addresses.

use super::join::join;
use crate::error::{AddressError, AddressResult};
use crate::models::{Address, IpVersion, SegInt, Section, SequentialRange};

/// Largest aligned block size exponent (`log2(size)`) that fits in `[lower, upper]`,
/// growing from `lower` (`from_lower`) or down from `upper`.
fn block_bits(bit_count: u8, lower: u128, upper: u128, from_lower: bool) -> u32 {
    let width = upper - lower;
    let fits = if width == u128::MAX {
        128
    } else {
        (width + 1).ilog2()
    };
    let aligned = if from_lower {
        lower.trailing_zeros()
    } else {
        upper.trailing_ones()
    };
    fits.min(aligned).min(u32::from(bit_count))
}

fn host_span(bits: u32) -> u128 {
    if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

/// The fewest prefix blocks exactly covering `[lower, upper]`, as
/// `(start, prefix_len)` pairs in ascending order.
///
/// Blocks are taken alternately from both ends, each the largest aligned
/// block that fits.
pub(crate) fn prefix_block_bounds(version: IpVersion, lower: u128, upper: u128) -> Vec<(u128, u8)> {
    let bit_count = version.bit_count();
    let mut front = Vec::new();
    let mut back = Vec::new();
    let (mut lower, mut upper) = (lower, upper);
    loop {
        let bits = block_bits(bit_count, lower, upper, true);
        let block_end = lower + host_span(bits);
        front.push((lower, bit_count - bits as u8));
        if block_end == upper {
            break;
        }
        lower = block_end + 1;

        let bits = block_bits(bit_count, lower, upper, false);
        let block_start = upper - host_span(bits);
        back.push((block_start, bit_count - bits as u8));
        if block_start == lower {
            break;
        }
        upper = block_start - 1;
    }
    front.extend(back.into_iter().rev());
    front
}

fn prefix_blocks_of(version: IpVersion, lower: u128, upper: u128) -> Vec<Section> {
    prefix_block_bounds(version, lower, upper)
        .into_iter()
        .map(|(start, prefix_len)| {
            let end = start | version.host_mask_value(prefix_len);
            Section::from_value_bounds(version, start, end, Some(prefix_len))
        })
        .collect()
}

/// The fewest sequential blocks exactly covering `[lower, upper]`.
///
/// Splits at the first differing segment `k`: a leading piece up to the end
/// of the lower block at `k`, a middle piece with full trailing segments, and
/// a trailing piece from the start of the upper block at `k`. Recursion depth
/// is bounded by the segment count.
fn sequential_blocks_of(version: IpVersion, lower: u128, upper: u128) -> Vec<Section> {
    let mut out = Vec::new();
    sequential_blocks_into(
        version,
        &version.split_value(lower),
        &version.split_value(upper),
        &mut out,
    );
    out
}

fn sequential_blocks_into(
    version: IpVersion,
    lower: &[SegInt],
    upper: &[SegInt],
    out: &mut Vec<Section>,
) {
    let max = version.max_segment_value();
    let Some(k) = lower.iter().zip(upper).position(|(lo, hi)| lo != hi) else {
        out.push(Section::from_bounds(
            version,
            lower.iter().map(|&v| (v, v)),
            None,
        ));
        return;
    };
    let lower_tail_zero = lower[k + 1..].iter().all(|&v| v == 0);
    let upper_tail_max = upper[k + 1..].iter().all(|&v| v == max);
    let block = |k_lower: SegInt, k_upper: SegInt| {
        Section::from_bounds(
            version,
            lower[..k]
                .iter()
                .map(|&v| (v, v))
                .chain(std::iter::once((k_lower, k_upper)))
                .chain(std::iter::repeat((0, max)).take(lower.len() - k - 1)),
            None,
        )
    };

    let middle_start = if lower_tail_zero {
        lower[k]
    } else {
        let mut leading_upper = lower.to_vec();
        leading_upper[k + 1..].iter_mut().for_each(|v| *v = max);
        sequential_blocks_into(version, lower, &leading_upper, out);
        lower[k] + 1
    };
    let middle_end = if upper_tail_max { upper[k] } else { upper[k] - 1 };
    if middle_start <= middle_end {
        out.push(block(middle_start, middle_end));
    }
    if !upper_tail_max {
        let mut trailing_lower = upper.to_vec();
        trailing_lower[k + 1..].iter_mut().for_each(|v| *v = 0);
        sequential_blocks_into(version, &trailing_lower, upper, out);
    }
}

/// Smallest single prefix block containing both values.
fn cover_of(version: IpVersion, lower: u128, upper: u128) -> Section {
    let differing = lower ^ upper;
    let host_bits = if differing == 0 {
        0
    } else {
        128 - differing.leading_zeros()
    };
    let prefix_len = version.bit_count() - host_bits as u8;
    let start = lower & version.network_mask_value(prefix_len);
    let end = start | version.host_mask_value(prefix_len);
    Section::from_value_bounds(version, start, end, Some(prefix_len))
}

/// Joined ranges of the sequential blocks of every section.
fn sequential_ranges<'a>(sections: impl IntoIterator<Item = &'a Section>) -> Vec<SequentialRange> {
    let ranges: Vec<SequentialRange> = sections
        .into_iter()
        .flat_map(|section| {
            if section.is_sequential() {
                vec![SequentialRange::from_section(section)]
            } else {
                section
                    .sequential_block_iter()
                    .map(|block| SequentialRange::from_section(&block))
                    .collect()
            }
        })
        .collect();
    join(&ranges)
}

fn check_versions<'a>(
    first: &Address,
    others: impl IntoIterator<Item = &'a Address>,
) -> AddressResult<()> {
    let version = first.version();
    match others.into_iter().find(|a| a.version() != version) {
        Some(other) => Err(AddressError::size_mismatch(
            version.segment_count(),
            other.version().segment_count(),
        )),
        None => Ok(()),
    }
}

impl SequentialRange {
    pub fn span_with_prefix_blocks(&self) -> Vec<Address> {
        prefix_blocks_of(self.version(), self.lower_value(), self.upper_value())
            .into_iter()
            .map(Address::new)
            .collect()
    }

    pub fn span_with_sequential_blocks(&self) -> Vec<Address> {
        sequential_blocks_of(self.version(), self.lower_value(), self.upper_value())
            .into_iter()
            .map(Address::new)
            .collect()
    }

    pub fn cover_with_prefix_block(&self) -> Address {
        Address::new(cover_of(
            self.version(),
            self.lower_value(),
            self.upper_value(),
        ))
    }
}

impl Section {
    /// The fewest prefix blocks exactly covering every value of the section.
    pub fn span_with_prefix_blocks(&self) -> Vec<Section> {
        if self.is_single_prefix_block() {
            return vec![self.clone()];
        }
        sequential_ranges([self])
            .iter()
            .flat_map(|r| prefix_blocks_of(self.version(), r.lower_value(), r.upper_value()))
            .collect()
    }

    /// The fewest sequential blocks exactly covering every value of the section.
    pub fn span_with_sequential_blocks(&self) -> Vec<Section> {
        if self.is_sequential() {
            return vec![self.without_prefix_len()];
        }
        sequential_ranges([self])
            .iter()
            .flat_map(|r| sequential_blocks_of(self.version(), r.lower_value(), r.upper_value()))
            .collect()
    }

    pub fn cover_with_prefix_block(&self) -> Section {
        cover_of(self.version(), self.lower_value(), self.upper_value())
    }
}

impl Address {
    pub fn span_with_prefix_blocks(&self) -> Vec<Address> {
        self.section()
            .span_with_prefix_blocks()
            .into_iter()
            .map(|s| self.wrap(s))
            .collect()
    }

    pub fn span_with_sequential_blocks(&self) -> Vec<Address> {
        self.section()
            .span_with_sequential_blocks()
            .into_iter()
            .map(|s| self.wrap(s))
            .collect()
    }

    pub fn cover_with_prefix_block(&self) -> Address {
        self.wrap(self.section().cover_with_prefix_block())
    }

    /// Prefix blocks spanning from the lowest to the highest value of both.
    pub fn span_with_prefix_blocks_to(&self, other: &Address) -> AddressResult<Vec<Address>> {
        Ok(SequentialRange::new(self, other)?.span_with_prefix_blocks())
    }

    /// Smallest prefix block containing every value of both.
    pub fn cover_with_prefix_block_to(&self, other: &Address) -> AddressResult<Address> {
        Ok(SequentialRange::new(self, other)?.cover_with_prefix_block())
    }

    /// The union of `self` and `others` as the fewest prefix blocks.
    pub fn merge_to_prefix_blocks(&self, others: &[Address]) -> AddressResult<Vec<Address>> {
        let all: Vec<Address> = std::iter::once(self.clone()).chain(others.iter().cloned()).collect();
        merge_to_prefix_blocks(&all)
    }

    /// The union of `self` and `others` as the fewest sequential blocks.
    pub fn merge_to_sequential_blocks(&self, others: &[Address]) -> AddressResult<Vec<Address>> {
        let all: Vec<Address> = std::iter::once(self.clone()).chain(others.iter().cloned()).collect();
        merge_to_sequential_blocks(&all)
    }
}

/// The union of all addresses as the fewest prefix blocks, ascending.
pub fn merge_to_prefix_blocks(addresses: &[Address]) -> AddressResult<Vec<Address>> {
    let Some(first) = addresses.first() else {
        return Ok(Vec::new());
    };
    check_versions(first, addresses)?;
    let ranges = sequential_ranges(addresses.iter().map(Address::section));
    log::debug!(
        "merging {} addresses as {} ranges into prefix blocks",
        addresses.len(),
        ranges.len()
    );
    Ok(ranges
        .iter()
        .flat_map(SequentialRange::span_with_prefix_blocks)
        .collect())
}

/// The union of all addresses as the fewest sequential blocks, ascending.
pub fn merge_to_sequential_blocks(addresses: &[Address]) -> AddressResult<Vec<Address>> {
    let Some(first) = addresses.first() else {
        return Ok(Vec::new());
    };
    check_versions(first, addresses)?;
    let ranges = sequential_ranges(addresses.iter().map(Address::section));
    Ok(ranges
        .iter()
        .flat_map(SequentialRange::span_with_sequential_blocks)
        .collect())
}
