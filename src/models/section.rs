//! Address sections: a fixed-length sequence of segments plus a prefix length.
//!
//! A [`Section`] is immutable. Every operation that changes values or the
//! prefix length returns a new section. Derived values (bounds, counts, mask
//! classification, display text) are memoized per instance and shared by
//! clones.

use super::mask::{mask_range, or_range, segment_host_mask, segment_network_mask};
use super::memo::MemoCell;
use super::segment::Segment;
use super::version::{IpVersion, SegInt};
use crate::error::{AddressError, AddressResult};
use itertools::Itertools;
use num_bigint::BigUint;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

/// How to treat ranged segments whose masked values are not contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode {
    /// Fail with [`AddressError::IncompatibleAddress`].
    #[default]
    Exact,
    /// Map the lower and upper bounds independently.
    BoundariesOnly,
}

#[derive(Default)]
struct SectionCache {
    lower: MemoCell<Section>,
    upper: MemoCell<Section>,
    count: MemoCell<BigUint>,
    network_mask_len: MemoCell<Option<u8>>,
    host_mask_len: MemoCell<Option<u8>>,
    min_block_prefix: MemoCell<u8>,
    single_block_prefix: MemoCell<Option<u8>>,
    text: MemoCell<String>,
}

/// Ordered, fixed-length sequence of segments with an optional prefix length.
#[derive(Clone)]
pub struct Section {
    pub(crate) version: IpVersion,
    pub(crate) segments: Arc<[Segment]>,
    pub(crate) prefix_len: Option<u8>,
    cache: Arc<SectionCache>,
}

/// Prefix length of the segment at `index` for a whole-section prefix length.
///
/// Segments entirely in the network part get `None`, the segment holding the
/// boundary gets the remainder and every later segment gets `Some(0)`.
pub(crate) fn segment_prefix_len(
    bits_per_segment: u8,
    prefix_len: Option<u8>,
    index: usize,
) -> Option<u8> {
    let prefix = u32::from(prefix_len?);
    let bits = u32::from(bits_per_segment);
    let start = index as u32 * bits;
    if prefix >= start + bits {
        None
    } else if prefix <= start {
        Some(0)
    } else {
        Some((prefix - start) as u8)
    }
}

/// The single address a value denotes, as a `std::net` address.
pub(crate) fn ip_addr_of(version: IpVersion, value: u128) -> IpAddr {
    match version {
        IpVersion::V4 => IpAddr::V4(Ipv4Addr::from(value as u32)),
        IpVersion::V6 => IpAddr::V6(Ipv6Addr::from(value)),
    }
}

fn check_prefix(version: IpVersion, prefix_len: Option<u8>) -> AddressResult<()> {
    match prefix_len {
        Some(p) if p > version.bit_count() => Err(AddressError::value(format!(
            "prefix length {p} exceeds {} bits of {version}",
            version.bit_count()
        ))),
        _ => Ok(()),
    }
}

impl Section {
    /// Build a section from segments; segment prefix annotations are
    /// re-derived from `prefix_len`.
    pub fn new(
        version: IpVersion,
        segments: Vec<Segment>,
        prefix_len: Option<u8>,
    ) -> AddressResult<Section> {
        if segments.len() != version.segment_count() {
            return Err(AddressError::value(format!(
                "{version} requires {} segments, got {}",
                version.segment_count(),
                segments.len()
            )));
        }
        if let Some(seg) = segments
            .iter()
            .find(|s| s.bit_count() != version.bits_per_segment())
        {
            return Err(AddressError::value(format!(
                "{version} segments are {} bits, got a {}-bit segment",
                version.bits_per_segment(),
                seg.bit_count()
            )));
        }
        check_prefix(version, prefix_len)?;
        Ok(Self::from_bounds(
            version,
            segments.iter().map(|s| (s.lower(), s.upper())),
            prefix_len,
        ))
    }

    /// Build a section from per-segment `(lower, upper)` pairs.
    pub fn from_ranges(
        version: IpVersion,
        ranges: &[(SegInt, SegInt)],
        prefix_len: Option<u8>,
    ) -> AddressResult<Section> {
        let bits = version.bits_per_segment();
        let segments = ranges
            .iter()
            .map(|&(lower, upper)| Segment::new(bits, lower, upper, None))
            .collect::<AddressResult<Vec<_>>>()?;
        Self::new(version, segments, prefix_len)
    }

    /// Build a single-valued section from segment values.
    pub fn from_values(
        version: IpVersion,
        values: &[SegInt],
        prefix_len: Option<u8>,
    ) -> AddressResult<Section> {
        let ranges: Vec<_> = values.iter().map(|&v| (v, v)).collect();
        Self::from_ranges(version, &ranges, prefix_len)
    }

    /// Build a single-valued section from a full address value.
    pub fn from_value(
        version: IpVersion,
        value: u128,
        prefix_len: Option<u8>,
    ) -> AddressResult<Section> {
        if value > version.max_value() {
            return Err(AddressError::value(format!(
                "value {value:#x} exceeds the {version} address space"
            )));
        }
        check_prefix(version, prefix_len)?;
        Ok(Self::from_value_bounds(version, value, value, prefix_len))
    }

    /// Build a single-valued section from 4 or 16 network-order bytes.
    pub fn from_bytes(bytes: &[u8], prefix_len: Option<u8>) -> AddressResult<Section> {
        let version = IpVersion::from_byte_count(bytes.len()).ok_or_else(|| {
            AddressError::value(format!(
                "address must be 4 or 16 bytes, got {}",
                bytes.len()
            ))
        })?;
        let value = bytes
            .iter()
            .fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
        Self::from_value(version, value, prefix_len)
    }

    /// Unchecked constructor for bounds already known to be valid.
    pub(crate) fn from_bounds<I>(version: IpVersion, bounds: I, prefix_len: Option<u8>) -> Section
    where
        I: IntoIterator<Item = (SegInt, SegInt)>,
    {
        let bits = version.bits_per_segment();
        let segments: Arc<[Segment]> = bounds
            .into_iter()
            .enumerate()
            .map(|(i, (lower, upper))| {
                Segment::from_parts(bits, lower, upper, segment_prefix_len(bits, prefix_len, i))
            })
            .collect();
        debug_assert_eq!(segments.len(), version.segment_count());
        Section {
            version,
            segments,
            prefix_len,
            cache: Arc::default(),
        }
    }

    /// Section whose segment bounds are the segments of `lower` and `upper`.
    ///
    /// Only valid where every segment of `lower` is at most the matching
    /// segment of `upper`, as for prefix blocks and sequential blocks.
    pub(crate) fn from_value_bounds(
        version: IpVersion,
        lower: u128,
        upper: u128,
        prefix_len: Option<u8>,
    ) -> Section {
        let bounds = version
            .split_value(lower)
            .into_iter()
            .zip(version.split_value(upper));
        Self::from_bounds(version, bounds, prefix_len)
    }

    /// Same values with a different prefix length (unchecked).
    pub(crate) fn with_prefix(&self, prefix_len: Option<u8>) -> Section {
        if prefix_len == self.prefix_len {
            return self.clone();
        }
        Self::from_bounds(self.version, self.bounds(), prefix_len)
    }

    pub(crate) fn bounds(&self) -> impl Iterator<Item = (SegInt, SegInt)> + '_ {
        self.segments.iter().map(|s| (s.lower(), s.upper()))
    }

    pub(crate) fn check_same_size(&self, other: &Section) -> AddressResult<()> {
        if self.version != other.version {
            return Err(AddressError::size_mismatch(
                self.segment_count(),
                other.segment_count(),
            ));
        }
        Ok(())
    }

    fn segment_prefix_at(&self, prefix_len: u8, index: usize) -> Option<u8> {
        segment_prefix_len(self.version.bits_per_segment(), Some(prefix_len), index)
    }

    pub fn version(&self) -> IpVersion {
        self.version
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn bit_count(&self) -> u8 {
        self.version.bit_count()
    }

    /// Segment at `index`.
    ///
    /// # Panics
    /// * If `index` is not below the segment count
    pub fn segment(&self, index: usize) -> &Segment {
        &self.segments[index]
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn prefix_len(&self) -> Option<u8> {
        self.prefix_len
    }

    pub fn is_prefixed(&self) -> bool {
        self.prefix_len.is_some()
    }

    /// Whether any segment holds more than one value.
    pub fn is_multiple(&self) -> bool {
        self.segments.iter().any(Segment::is_multiple)
    }

    /// Whether the values form one contiguous address range: after the first
    /// ranged segment every segment is full range.
    pub fn is_sequential(&self) -> bool {
        match self.segments.iter().position(Segment::is_multiple) {
            None => true,
            Some(i) => self.segments[i + 1..].iter().all(Segment::is_full_range),
        }
    }

    /// Lowest value, keeping the prefix length.
    pub fn lower(&self) -> Section {
        if !self.is_multiple() {
            return self.clone();
        }
        self.cache
            .lower
            .get_or_compute(|| {
                Self::from_bounds(
                    self.version,
                    self.segments.iter().map(|s| (s.lower(), s.lower())),
                    self.prefix_len,
                )
            })
            .clone()
    }

    /// Highest value, keeping the prefix length.
    pub fn upper(&self) -> Section {
        if !self.is_multiple() {
            return self.clone();
        }
        self.cache
            .upper
            .get_or_compute(|| {
                Self::from_bounds(
                    self.version,
                    self.segments.iter().map(|s| (s.upper(), s.upper())),
                    self.prefix_len,
                )
            })
            .clone()
    }

    /// Lowest value as an unsigned integer.
    pub fn lower_value(&self) -> u128 {
        self.version
            .join_values(self.segments.iter().map(Segment::lower))
    }

    /// Highest value as an unsigned integer.
    pub fn upper_value(&self) -> u128 {
        self.version
            .join_values(self.segments.iter().map(Segment::upper))
    }

    /// Number of distinct values.
    pub fn count(&self) -> BigUint {
        self.cache
            .count
            .get_or_compute(|| {
                self.segments
                    .iter()
                    .fold(BigUint::from(1u32), |acc, s| acc * s.count())
            })
            .clone()
    }

    /// Number of distinct prefixes of length `prefix_len`.
    pub fn prefix_count(&self, prefix_len: u8) -> BigUint {
        let prefix_len = prefix_len.min(self.bit_count());
        self.segments
            .iter()
            .enumerate()
            .fold(BigUint::from(1u32), |acc, (i, s)| {
                match self.segment_prefix_at(prefix_len, i) {
                    None => acc * s.count(),
                    Some(sp) => {
                        let host_bits = s.bit_count() - sp;
                        acc * ((s.upper() >> host_bits) - (s.lower() >> host_bits) + 1)
                    }
                }
            })
    }

    /// Whether every value of `other` is a value of this section.
    pub fn contains(&self, other: &Section) -> bool {
        self.version == other.version
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a.contains(b))
    }

    /// Whether the two sections share at least one value.
    pub fn overlaps(&self, other: &Section) -> bool {
        self.version == other.version
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a.overlaps(b))
    }

    pub fn set_prefix_len(&self, prefix_len: u8) -> AddressResult<Section> {
        check_prefix(self.version, Some(prefix_len))?;
        Ok(self.with_prefix(Some(prefix_len)))
    }

    pub fn without_prefix_len(&self) -> Section {
        self.with_prefix(None)
    }

    /// Boundary bit count if this section is a network mask (`network`) or a
    /// host mask (`!network`).
    ///
    /// A network mask is leading ones then zeros, a host mask is leading
    /// zeros then ones. Returns `None` for any other bit pattern and for
    /// multiple-valued sections.
    pub fn block_mask_prefix_len(&self, network: bool) -> Option<u8> {
        let cell = if network {
            &self.cache.network_mask_len
        } else {
            &self.cache.host_mask_len
        };
        *cell.get_or_compute(|| self.compute_block_mask_prefix_len(network))
    }

    fn compute_block_mask_prefix_len(&self, network: bool) -> Option<u8> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Phase {
            Leading,
            Tail,
        }

        if self.is_multiple() {
            return None;
        }
        let bits = self.version.bits_per_segment();
        let max = self.version.max_segment_value();
        let (leading, tail) = if network { (max, 0) } else { (0, max) };
        let mut phase = Phase::Leading;
        let mut prefix_len = self.bit_count();
        for (i, seg) in self.segments.iter().enumerate() {
            let value = seg.lower();
            match phase {
                Phase::Leading if value == leading => {}
                Phase::Leading => {
                    // the one segment allowed to hold the boundary
                    let aligned = value << (SegInt::BITS - u32::from(bits));
                    let (seg_prefix, expected) = if network {
                        let ones = aligned.leading_ones() as u8;
                        (ones, segment_network_mask(bits, ones))
                    } else {
                        let zeros = aligned.leading_zeros().min(u32::from(bits)) as u8;
                        (zeros, segment_host_mask(bits, zeros))
                    };
                    if value != expected {
                        return None;
                    }
                    prefix_len = i as u8 * bits + seg_prefix;
                    phase = Phase::Tail;
                }
                Phase::Tail if value == tail => {}
                Phase::Tail => return None,
            }
        }
        Some(prefix_len)
    }

    /// Whether the network part for the section's own prefix is a single
    /// value; without a prefix, whether the section is single-valued.
    pub fn is_single_network(&self) -> bool {
        match self.prefix_len {
            Some(p) => self.is_single_network_len(p),
            None => !self.is_multiple(),
        }
    }

    pub fn is_single_network_len(&self, prefix_len: u8) -> bool {
        let prefix_len = prefix_len.min(self.bit_count());
        self.segments
            .iter()
            .enumerate()
            .all(|(i, seg)| match self.segment_prefix_at(prefix_len, i) {
                None => !seg.is_multiple(),
                Some(sp) => seg.is_single_network(sp),
            })
    }

    fn all_host_segments(&self, prefix_len: u8, f: impl Fn(&Segment, u8) -> bool) -> bool {
        let prefix_len = prefix_len.min(self.bit_count());
        self.segments
            .iter()
            .enumerate()
            .all(|(i, seg)| match self.segment_prefix_at(prefix_len, i) {
                None => true,
                Some(sp) => f(seg, sp),
            })
    }

    /// Whether the section is prefixed and every value has a zero host.
    pub fn is_zero_host(&self) -> bool {
        self.prefix_len.is_some_and(|p| self.is_zero_host_len(p))
    }

    pub fn is_zero_host_len(&self, prefix_len: u8) -> bool {
        self.all_host_segments(prefix_len, |seg, sp| seg.is_zero_host(sp))
    }

    /// Whether the section is prefixed and every value has an all-ones host.
    pub fn is_max_host(&self) -> bool {
        self.prefix_len.is_some_and(|p| self.is_max_host_len(p))
    }

    pub fn is_max_host_len(&self, prefix_len: u8) -> bool {
        self.all_host_segments(prefix_len, |seg, sp| seg.is_max_host(sp))
    }

    /// Whether the section is prefixed and some value has a zero host.
    pub fn includes_zero_host(&self) -> bool {
        self.prefix_len
            .is_some_and(|p| self.includes_zero_host_len(p))
    }

    pub fn includes_zero_host_len(&self, prefix_len: u8) -> bool {
        self.all_host_segments(prefix_len, |seg, sp| seg.includes_zero_host(sp))
    }

    /// Whether the section is prefixed and some value has an all-ones host.
    pub fn includes_max_host(&self) -> bool {
        self.prefix_len
            .is_some_and(|p| self.includes_max_host_len(p))
    }

    pub fn includes_max_host_len(&self, prefix_len: u8) -> bool {
        self.all_host_segments(prefix_len, |seg, sp| seg.includes_max_host(sp))
    }

    /// Clear the host bits for the section's prefix; an unprefixed section
    /// becomes all zeros.
    pub fn to_zero_host(&self) -> AddressResult<Section> {
        match self.prefix_len {
            Some(p) => self.to_zero_host_len(p),
            None => Ok(Self::from_bounds(
                self.version,
                std::iter::repeat((0, 0)).take(self.segment_count()),
                None,
            )),
        }
    }

    pub fn to_zero_host_len(&self, prefix_len: u8) -> AddressResult<Section> {
        self.to_zero_host_len_with(prefix_len, MaskMode::Exact)
    }

    /// Clear the bits after `prefix_len`, keeping the section's own prefix.
    pub fn to_zero_host_len_with(&self, prefix_len: u8, mode: MaskMode) -> AddressResult<Section> {
        check_prefix(self.version, Some(prefix_len))?;
        if self.is_zero_host_len(prefix_len) {
            return Ok(self.clone());
        }
        if self.is_single_network_len(prefix_len) && self.includes_zero_host_len(prefix_len) {
            return Ok(self.lower());
        }
        self.convert_host(prefix_len, false, mode)
    }

    /// Set the host bits for the section's prefix; an unprefixed section
    /// becomes all ones.
    pub fn to_max_host(&self) -> AddressResult<Section> {
        match self.prefix_len {
            Some(p) => self.to_max_host_len(p),
            None => {
                let max = self.version.max_segment_value();
                Ok(Self::from_bounds(
                    self.version,
                    std::iter::repeat((max, max)).take(self.segment_count()),
                    None,
                ))
            }
        }
    }

    pub fn to_max_host_len(&self, prefix_len: u8) -> AddressResult<Section> {
        self.to_max_host_len_with(prefix_len, MaskMode::Exact)
    }

    /// Set the bits after `prefix_len`, keeping the section's own prefix.
    pub fn to_max_host_len_with(&self, prefix_len: u8, mode: MaskMode) -> AddressResult<Section> {
        check_prefix(self.version, Some(prefix_len))?;
        if self.is_max_host_len(prefix_len) {
            return Ok(self.clone());
        }
        if self.is_single_network_len(prefix_len) && self.includes_max_host_len(prefix_len) {
            return Ok(self.upper());
        }
        self.convert_host(prefix_len, true, mode)
    }

    fn convert_host(&self, prefix_len: u8, to_max: bool, mode: MaskMode) -> AddressResult<Section> {
        let bits = self.version.bits_per_segment();
        let max = self.version.max_segment_value();
        let mut bounds = Vec::with_capacity(self.segment_count());
        for (i, seg) in self.segments.iter().enumerate() {
            let Some(sp) = self.segment_prefix_at(prefix_len, i) else {
                bounds.push((seg.lower(), seg.upper()));
                continue;
            };
            let masked = if to_max {
                or_range(seg.lower(), seg.upper(), segment_host_mask(bits, sp), max)
            } else {
                mask_range(seg.lower(), seg.upper(), segment_network_mask(bits, sp), max)
            };
            if !masked.sequential && mode == MaskMode::Exact {
                log::debug!(
                    "segment {i} range {}-{} of {self} is not contiguous with a /{prefix_len} host {}",
                    seg.lower(),
                    seg.upper(),
                    if to_max { "set" } else { "cleared" }
                );
                return Err(AddressError::incompatible(format!(
                    "{} host of {self} at /{prefix_len} is not a contiguous range",
                    if to_max { "max" } else { "zero" }
                )));
            }
            bounds.push((masked.lower, masked.upper));
        }
        Ok(Self::from_bounds(self.version, bounds, self.prefix_len))
    }

    /// Whether the section is prefixed and spans the whole block of every
    /// network value for that prefix.
    pub fn is_prefix_block(&self) -> bool {
        self.prefix_len.is_some_and(|p| self.is_prefix_block_len(p))
    }

    pub fn is_prefix_block_len(&self, prefix_len: u8) -> bool {
        self.all_host_segments(prefix_len, |seg, sp| seg.is_prefix_block(sp))
    }

    /// Prefix block whose network part is a single value.
    pub fn is_single_prefix_block(&self) -> bool {
        self.prefix_len
            .is_some_and(|p| self.is_single_prefix_block_len(p))
    }

    pub fn is_single_prefix_block_len(&self, prefix_len: u8) -> bool {
        self.is_single_network_len(prefix_len) && self.is_prefix_block_len(prefix_len)
    }

    /// Smallest prefix length at which this section is a prefix block.
    pub fn min_prefix_len_for_block(&self) -> u8 {
        *self.cache.min_block_prefix.get_or_compute(|| {
            let bits = self.version.bits_per_segment();
            let mut total = self.bit_count();
            for seg in self.segments.iter().rev() {
                let seg_prefix = seg.min_prefix_len_for_block();
                if seg_prefix == bits {
                    break;
                }
                total -= bits;
                if seg_prefix != 0 {
                    total += seg_prefix;
                    break;
                }
            }
            total
        })
    }

    /// Prefix length for which this section is exactly one prefix block.
    pub fn prefix_len_for_single_block(&self) -> Option<u8> {
        *self.cache.single_block_prefix.get_or_compute(|| {
            let prefix_len = self.min_prefix_len_for_block();
            self.is_single_network_len(prefix_len).then_some(prefix_len)
        })
    }

    /// The prefix block of the section's own prefix; unprefixed sections
    /// are returned unchanged.
    pub fn to_prefix_block(&self) -> Section {
        match self.prefix_len {
            Some(p) => self.prefix_block_unchecked(p),
            None => self.clone(),
        }
    }

    /// Expand every host part after `prefix_len` to its full range.
    pub fn to_prefix_block_len(&self, prefix_len: u8) -> AddressResult<Section> {
        check_prefix(self.version, Some(prefix_len))?;
        Ok(self.prefix_block_unchecked(prefix_len))
    }

    fn prefix_block_unchecked(&self, prefix_len: u8) -> Section {
        if self.prefix_len == Some(prefix_len) && self.is_prefix_block_len(prefix_len) {
            return self.clone();
        }
        let bits = self.version.bits_per_segment();
        let bounds = self
            .segments
            .iter()
            .enumerate()
            .map(|(i, seg)| match self.segment_prefix_at(prefix_len, i) {
                None => (seg.lower(), seg.upper()),
                Some(sp) => (
                    seg.lower() & segment_network_mask(bits, sp),
                    seg.upper() | segment_host_mask(bits, sp),
                ),
            })
            .collect::<Vec<_>>();
        Self::from_bounds(self.version, bounds, Some(prefix_len))
    }

    /// Same values, prefixed with the length at which they form one block.
    pub fn assign_prefix_for_single_block(&self) -> Option<Section> {
        self.prefix_len_for_single_block()
            .map(|p| self.with_prefix(Some(p)))
    }

    /// Same values, prefixed with [`Self::min_prefix_len_for_block`].
    pub fn assign_min_prefix_for_block(&self) -> Section {
        self.with_prefix(Some(self.min_prefix_len_for_block()))
    }

    /// Network mask section (`prefix_len` leading ones).
    pub fn network_mask(version: IpVersion, prefix_len: u8) -> AddressResult<Section> {
        check_prefix(version, Some(prefix_len))?;
        Self::from_value(version, version.network_mask_value(prefix_len), None)
    }

    /// Host mask section (`prefix_len` leading zeros).
    pub fn host_mask(version: IpVersion, prefix_len: u8) -> AddressResult<Section> {
        check_prefix(version, Some(prefix_len))?;
        Self::from_value(version, version.host_mask_value(prefix_len), None)
    }

    /// Bitwise AND with the lowest value of `mask`, keeping the prefix length.
    pub fn mask(&self, mask: &Section) -> AddressResult<Section> {
        self.apply_mask(mask, false)
    }

    /// Bitwise OR with the lowest value of `mask`, keeping the prefix length.
    pub fn bitwise_or(&self, mask: &Section) -> AddressResult<Section> {
        self.apply_mask(mask, true)
    }

    fn apply_mask(&self, mask: &Section, or: bool) -> AddressResult<Section> {
        self.check_same_size(mask)?;
        let max = self.version.max_segment_value();
        let mut bounds = Vec::with_capacity(self.segment_count());
        for (i, (seg, mask_seg)) in self.segments.iter().zip(mask.segments.iter()).enumerate() {
            let m = mask_seg.lower();
            let masked = if or {
                or_range(seg.lower(), seg.upper(), m, max)
            } else {
                mask_range(seg.lower(), seg.upper(), m, max)
            };
            if !masked.sequential {
                return Err(AddressError::incompatible(format!(
                    "segment {i} range {}-{} {} {m:#x} is not a contiguous range",
                    seg.lower(),
                    seg.upper(),
                    if or { "|" } else { "&" }
                )));
            }
            bounds.push((masked.lower, masked.upper));
        }
        Ok(Self::from_bounds(self.version, bounds, self.prefix_len))
    }

    /// Segments in reverse order; the prefix length is dropped.
    pub fn reverse_segments(&self) -> Section {
        let bounds: Vec<_> = self.bounds().collect();
        Self::from_bounds(self.version, bounds.into_iter().rev(), None)
    }

    /// Reverse every bit of the section; the prefix length is dropped.
    pub fn reverse_bits(&self) -> AddressResult<Section> {
        let reversed = self
            .segments
            .iter()
            .rev()
            .map(|s| s.reverse_bits().map(|r| (r.lower(), r.upper())))
            .collect::<AddressResult<Vec<_>>>()?;
        Ok(Self::from_bounds(self.version, reversed, None))
    }

    /// Reverse the byte order of the section; the prefix length is dropped.
    pub fn reverse_bytes(&self) -> AddressResult<Section> {
        let reversed = self
            .segments
            .iter()
            .rev()
            .map(|s| s.reverse_bytes().map(|r| (r.lower(), r.upper())))
            .collect::<AddressResult<Vec<_>>>()?;
        Ok(Self::from_bounds(self.version, reversed, None))
    }

    fn render(&self) -> String {
        let mut text = if !self.is_multiple() || self.is_single_prefix_block() {
            ip_addr_of(self.version, self.lower_value()).to_string()
        } else {
            let (separator, hex) = match self.version {
                IpVersion::V4 => (".", false),
                IpVersion::V6 => (":", true),
            };
            self.segments
                .iter()
                .map(|s| match (s.is_multiple(), hex) {
                    (false, false) => format!("{}", s.lower()),
                    (true, false) => format!("{}-{}", s.lower(), s.upper()),
                    (false, true) => format!("{:x}", s.lower()),
                    (true, true) => format!("{:x}-{:x}", s.lower(), s.upper()),
                })
                .join(separator)
        };
        if let Some(p) = self.prefix_len {
            text.push('/');
            text.push_str(&p.to_string());
        }
        text
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache.text.get_or_compute(|| self.render()))
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("version", &self.version)
            .field("segments", &self.bounds().collect::<Vec<_>>())
            .field("prefix_len", &self.prefix_len)
            .finish()
    }
}

// Equality and hashing ignore the cache.
impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.prefix_len == other.prefix_len
            && self.segments == other.segments
    }
}

impl Eq for Section {}

impl Hash for Section {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
        self.prefix_len.hash(state);
        self.segments.hash(state);
    }
}

impl PartialOrd for Section {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by version, then lowest value, then highest value, then prefix length.
impl Ord for Section {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.lower_value().cmp(&other.lower_value()))
            .then_with(|| self.upper_value().cmp(&other.upper_value()))
            .then_with(|| self.prefix_len.cmp(&other.prefix_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v4(ranges: &[(SegInt, SegInt)], prefix: Option<u8>) -> Section {
        Section::from_ranges(IpVersion::V4, ranges, prefix).unwrap()
    }

    fn v4_single(values: [SegInt; 4], prefix: Option<u8>) -> Section {
        Section::from_values(IpVersion::V4, &values, prefix).unwrap()
    }

    #[test]
    fn test_construction_errors() {
        assert!(Section::from_values(IpVersion::V4, &[1, 2, 3], None).is_err());
        assert!(Section::from_values(IpVersion::V4, &[1, 2, 3, 256], None).is_err());
        assert!(Section::from_values(IpVersion::V4, &[1, 2, 3, 4], Some(33)).is_err());
        assert!(Section::from_value(IpVersion::V4, 1u128 << 32, None).is_err());
        assert!(Section::from_bytes(&[1, 2, 3], None).is_err());
        let s = Section::from_bytes(&[10, 0, 0, 1], Some(8)).unwrap();
        assert_eq!(s.lower_value(), 0x0A000001);
        assert_eq!(s.prefix_len(), Some(8));
    }

    #[test]
    fn test_segment_prefixes_follow_section_prefix() {
        let s = v4_single([10, 1, 2, 3], Some(12));
        assert_eq!(s.segment(0).prefix_len(), None);
        assert_eq!(s.segment(1).prefix_len(), Some(4));
        assert_eq!(s.segment(2).prefix_len(), Some(0));
        assert_eq!(s.segment(3).prefix_len(), Some(0));

        let s = v4_single([10, 1, 2, 3], Some(16));
        assert_eq!(s.segment(1).prefix_len(), None);
        assert_eq!(s.segment(2).prefix_len(), Some(0));
    }

    #[test]
    fn test_bounds_and_count() {
        let s = v4(&[(1, 1), (2, 3), (0, 255), (0, 255)], None);
        assert!(s.is_multiple());
        assert!(s.is_sequential());
        assert_eq!(s.lower().lower_value(), 0x01020000);
        assert_eq!(s.upper().upper_value(), 0x0103FFFF);
        assert_eq!(s.count(), BigUint::from(2u32 * 256 * 256));
        assert_eq!(s.prefix_count(16), BigUint::from(2u32));

        let s = v4(&[(1, 2), (5, 6), (0, 0), (0, 0)], None);
        assert!(!s.is_sequential());
        assert_eq!(s.count(), BigUint::from(4u32));

        let full = Section::from_ranges(IpVersion::V6, &[(0, 0xffff); 8], None).unwrap();
        assert_eq!(full.count(), BigUint::from(1u8) << 128);
    }

    #[test]
    fn test_block_mask_prefix_len() {
        let ones = v4_single([255, 255, 255, 255], None);
        assert_eq!(ones.block_mask_prefix_len(true), Some(32));
        assert_eq!(ones.block_mask_prefix_len(false), Some(0));

        let zeros = v4_single([0, 0, 0, 0], None);
        assert_eq!(zeros.block_mask_prefix_len(true), Some(0));
        assert_eq!(zeros.block_mask_prefix_len(false), Some(32));

        let net = v4_single([255, 255, 254, 0], None);
        assert_eq!(net.block_mask_prefix_len(true), Some(23));
        assert_eq!(net.block_mask_prefix_len(false), None);

        let host = v4_single([0, 0, 1, 255], None);
        assert_eq!(host.block_mask_prefix_len(false), Some(23));
        assert_eq!(host.block_mask_prefix_len(true), None);

        assert_eq!(v4_single([255, 0, 255, 0], None).block_mask_prefix_len(true), None);
        assert_eq!(v4_single([255, 253, 0, 0], None).block_mask_prefix_len(true), None);
        assert_eq!(v4(&[(255, 255), (0, 1), (0, 0), (0, 0)], None).block_mask_prefix_len(true), None);

        let mask = Section::network_mask(IpVersion::V6, 64).unwrap();
        assert_eq!(mask.block_mask_prefix_len(true), Some(64));
        let mask = Section::host_mask(IpVersion::V6, 100).unwrap();
        assert_eq!(mask.block_mask_prefix_len(false), Some(100));
    }

    #[test]
    fn test_network_and_host_classification() {
        let s = v4(&[(10, 10), (1, 1), (0, 255), (0, 255)], Some(16));
        assert!(s.is_single_network());
        assert!(s.is_prefix_block());
        assert!(s.is_single_prefix_block());
        assert!(!s.is_zero_host());
        assert!(s.includes_zero_host());
        assert!(s.includes_max_host());

        let s = v4_single([10, 1, 0, 0], Some(16));
        assert!(s.is_zero_host());
        assert!(!s.is_max_host());
        assert!(s.is_max_host_len(32));
        assert!(s.is_zero_host_len(32));

        let s = v4(&[(10, 11), (0, 255), (0, 255), (0, 255)], Some(8));
        assert!(!s.is_single_network());
        assert!(s.is_prefix_block());
        assert!(!s.is_single_prefix_block());
        assert!(s.is_single_prefix_block_len(7));

        assert!(!v4_single([1, 2, 3, 4], None).is_zero_host());
    }

    #[test]
    fn test_to_zero_and_max_host() {
        let s = v4_single([192, 168, 1, 77], Some(24));
        let zero = s.to_zero_host().unwrap();
        assert_eq!(zero, v4_single([192, 168, 1, 0], Some(24)));
        let max = s.to_max_host().unwrap();
        assert_eq!(max, v4_single([192, 168, 1, 255], Some(24)));

        let zero = s.to_zero_host_len(20).unwrap();
        assert_eq!(zero, v4_single([192, 168, 0, 0], Some(24)));

        // already zero host returns the same instance value
        let z = zero.to_zero_host_len(20).unwrap();
        assert_eq!(z, zero);

        let unprefixed = v4_single([1, 2, 3, 4], None);
        assert_eq!(unprefixed.to_zero_host().unwrap(), v4_single([0, 0, 0, 0], None));
        assert_eq!(unprefixed.to_max_host().unwrap(), v4_single([255, 255, 255, 255], None));
    }

    #[test]
    fn test_to_zero_host_ranged() {
        // 10.1-2.*.* /16: each network value keeps a zero host
        let s = v4(&[(10, 10), (1, 2), (0, 255), (0, 255)], Some(16));
        let zero = s.to_zero_host().unwrap();
        assert_eq!(zero, v4(&[(10, 10), (1, 2), (0, 0), (0, 0)], Some(16)));

        // 1.2.3.5-9 /30 -> host cleared gives {4, 8}: not contiguous
        let s = v4(&[(1, 1), (2, 2), (3, 3), (5, 9)], None);
        let err = s.to_zero_host_len(30).unwrap_err();
        assert!(matches!(err, AddressError::IncompatibleAddress(_)));
        let bounds = s
            .to_zero_host_len_with(30, MaskMode::BoundariesOnly)
            .unwrap();
        assert_eq!(bounds, v4(&[(1, 1), (2, 2), (3, 3), (4, 8)], None));

        // single network including the zero host: the lower bound
        let s = v4(&[(1, 1), (2, 2), (3, 3), (4, 7)], Some(30));
        assert_eq!(s.to_zero_host().unwrap(), v4_single([1, 2, 3, 4], Some(30)));
        assert_eq!(s.to_max_host().unwrap(), v4_single([1, 2, 3, 7], Some(30)));
    }

    #[test]
    fn test_prefix_blocks() {
        let s = v4_single([10, 1, 2, 3], None);
        let block = s.to_prefix_block_len(16).unwrap();
        assert_eq!(block, v4(&[(10, 10), (1, 1), (0, 255), (0, 255)], Some(16)));
        assert_eq!(block.to_string(), "10.1.0.0/16");
        assert_eq!(block.min_prefix_len_for_block(), 16);
        assert_eq!(block.prefix_len_for_single_block(), Some(16));
        assert_eq!(s.min_prefix_len_for_block(), 32);
        assert_eq!(s.prefix_len_for_single_block(), Some(32));

        let s = v4(&[(10, 10), (1, 2), (0, 255), (0, 255)], None);
        assert_eq!(s.min_prefix_len_for_block(), 16);
        assert_eq!(s.prefix_len_for_single_block(), None);
        assert_eq!(s.assign_min_prefix_for_block().prefix_len(), Some(16));
        assert!(s.assign_prefix_for_single_block().is_none());

        let s = v4(&[(10, 10), (2, 3), (0, 255), (0, 255)], None);
        assert_eq!(s.prefix_len_for_single_block(), Some(15));
    }

    #[test]
    fn test_mask_and_or() {
        let s = v4(&[(10, 10), (1, 1), (0, 255), (7, 7)], None);
        let mask = Section::network_mask(IpVersion::V4, 16).unwrap();
        assert_eq!(s.mask(&mask).unwrap(), v4_single([10, 1, 0, 0], None));

        let host = Section::host_mask(IpVersion::V4, 24).unwrap();
        let or = v4_single([10, 1, 2, 3], None).bitwise_or(&host).unwrap();
        assert_eq!(or, v4_single([10, 1, 2, 255], None));

        let odd = v4_single([255, 255, 0xf0, 255], None);
        assert!(s.mask(&odd).is_err());

        let v6 = Section::from_value(IpVersion::V6, 1, None).unwrap();
        assert!(matches!(s.mask(&v6), Err(AddressError::SizeMismatch { expected: 4, actual: 8 })));
    }

    #[test]
    fn test_reverse() {
        let s = v4_single([1, 2, 3, 4], Some(8));
        assert_eq!(s.reverse_segments(), v4_single([4, 3, 2, 1], None));
        assert_eq!(s.reverse_bytes().unwrap(), v4_single([4, 3, 2, 1], None));
        assert_eq!(
            v4_single([0, 0, 0, 1], None).reverse_bits().unwrap(),
            v4_single([128, 0, 0, 0], None)
        );
        assert!(v4(&[(1, 2), (0, 0), (0, 0), (0, 0)], None).reverse_bits().is_err());

        let v6 = Section::from_value(IpVersion::V6, 0x1234, None).unwrap();
        assert_eq!(v6.reverse_bytes().unwrap().lower_value(), 0x3412u128 << 112);
    }

    #[test]
    fn test_display() {
        assert_eq!(v4_single([1, 2, 3, 4], None).to_string(), "1.2.3.4");
        assert_eq!(v4_single([1, 2, 3, 4], Some(24)).to_string(), "1.2.3.4/24");
        assert_eq!(v4(&[(1, 1), (2, 3), (0, 0), (4, 4)], None).to_string(), "1.2-3.0.4");
        let v6 = Section::from_value(IpVersion::V6, 1, None).unwrap();
        assert_eq!(v6.to_string(), "::1");
    }

    #[test]
    fn test_equality_ignores_cache() {
        let a = v4(&[(1, 2), (0, 0), (0, 0), (0, 0)], None);
        let b = v4(&[(1, 2), (0, 0), (0, 0), (0, 0)], None);
        let _ = a.count();
        assert_eq!(a, b);
        assert!(v4_single([1, 0, 0, 0], None) < v4_single([1, 0, 0, 1], None));
    }
}
