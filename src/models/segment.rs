//! A single fixed-width division of an address.

use super::mask::{segment_host_mask, segment_network_mask};
use super::version::SegInt;
use crate::error::{AddressError, AddressResult};

/// One segment: a range of values `[lower, upper]` of `bit_count` bits,
/// optionally annotated with a segment-local prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    lower: SegInt,
    upper: SegInt,
    bit_count: u8,
    prefix_len: Option<u8>,
}

impl Segment {
    /// Create a segment covering `[lower, upper]`.
    pub fn new(
        bit_count: u8,
        lower: SegInt,
        upper: SegInt,
        prefix_len: Option<u8>,
    ) -> AddressResult<Segment> {
        if bit_count != 8 && bit_count != 16 {
            return Err(AddressError::value(format!(
                "unsupported segment width {bit_count}"
            )));
        }
        let max = Self::max_value_for(bit_count);
        if lower > upper {
            return Err(AddressError::value(format!(
                "segment lower value {lower} exceeds upper value {upper}"
            )));
        }
        if upper > max {
            return Err(AddressError::value(format!(
                "segment value {upper} exceeds {bit_count}-bit maximum {max}"
            )));
        }
        if let Some(p) = prefix_len {
            if p > bit_count {
                return Err(AddressError::value(format!(
                    "segment prefix length {p} exceeds {bit_count} bits"
                )));
            }
        }
        Ok(Segment {
            lower,
            upper,
            bit_count,
            prefix_len,
        })
    }

    /// Single-valued segment.
    pub fn single(bit_count: u8, value: SegInt) -> AddressResult<Segment> {
        Self::new(bit_count, value, value, None)
    }

    /// Internal constructor for values already known to be valid.
    pub(crate) fn from_parts(
        bit_count: u8,
        lower: SegInt,
        upper: SegInt,
        prefix_len: Option<u8>,
    ) -> Segment {
        debug_assert!(lower <= upper && upper <= Self::max_value_for(bit_count));
        Segment {
            lower,
            upper,
            bit_count,
            prefix_len,
        }
    }

    pub const fn max_value_for(bit_count: u8) -> SegInt {
        (1 << bit_count) - 1
    }

    pub fn lower(&self) -> SegInt {
        self.lower
    }

    pub fn upper(&self) -> SegInt {
        self.upper
    }

    pub fn bit_count(&self) -> u8 {
        self.bit_count
    }

    pub fn prefix_len(&self) -> Option<u8> {
        self.prefix_len
    }

    pub fn max_value(&self) -> SegInt {
        Self::max_value_for(self.bit_count)
    }

    pub fn is_multiple(&self) -> bool {
        self.lower != self.upper
    }

    /// Whether the segment spans every value of its width.
    pub fn is_full_range(&self) -> bool {
        self.lower == 0 && self.upper == self.max_value()
    }

    /// Number of values in the segment.
    pub fn count(&self) -> u32 {
        self.upper - self.lower + 1
    }

    pub fn contains(&self, other: &Segment) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }

    pub fn contains_value(&self, value: SegInt) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn overlaps(&self, other: &Segment) -> bool {
        !(other.lower > self.upper || self.lower > other.upper)
    }

    /// Same values with a different prefix annotation.
    pub(crate) fn with_prefix(&self, prefix_len: Option<u8>) -> Segment {
        Segment {
            prefix_len,
            ..*self
        }
    }

    /// Whether every host value after `prefix_len` bits is present for the
    /// lowest and highest network values.
    pub fn is_prefix_block(&self, prefix_len: u8) -> bool {
        let host = segment_host_mask(self.bit_count, prefix_len);
        self.lower & host == 0 && self.upper & host == host
    }

    /// Prefix block whose network part is a single value.
    pub fn is_single_prefix_block(&self, prefix_len: u8) -> bool {
        let network = segment_network_mask(self.bit_count, prefix_len);
        self.is_prefix_block(prefix_len) && self.lower & network == self.upper & network
    }

    /// Smallest segment-local prefix length at which the segment is a prefix block.
    pub fn min_prefix_len_for_block(&self) -> u8 {
        let trailing = self
            .lower
            .trailing_zeros()
            .min(self.upper.trailing_ones())
            .min(u32::from(self.bit_count));
        self.bit_count - trailing as u8
    }

    /// Whether the network part (first `prefix_len` bits) is single-valued.
    pub fn is_single_network(&self, prefix_len: u8) -> bool {
        let host_bits = self.bit_count - prefix_len;
        (self.lower >> host_bits) == (self.upper >> host_bits)
    }

    /// Whether both bounds have an all-zero host after `prefix_len` bits.
    pub fn is_zero_host(&self, prefix_len: u8) -> bool {
        let host = segment_host_mask(self.bit_count, prefix_len);
        self.lower & host == 0 && self.upper & host == 0
    }

    /// Whether both bounds have an all-ones host after `prefix_len` bits.
    pub fn is_max_host(&self, prefix_len: u8) -> bool {
        let host = segment_host_mask(self.bit_count, prefix_len);
        self.lower & host == host && self.upper & host == host
    }

    /// Whether some value in the segment has an all-zero host.
    pub fn includes_zero_host(&self, prefix_len: u8) -> bool {
        let host = segment_host_mask(self.bit_count, prefix_len);
        if self.lower & host == 0 {
            return true;
        }
        // next value above `lower` with a zero host
        let next = u64::from(self.lower | host) + 1;
        next <= u64::from(self.upper)
    }

    /// Whether some value in the segment has an all-ones host.
    pub fn includes_max_host(&self, prefix_len: u8) -> bool {
        let host = segment_host_mask(self.bit_count, prefix_len);
        (self.lower | host) <= self.upper
    }

    /// Reverse the bit order of the segment.
    pub fn reverse_bits(&self) -> AddressResult<Segment> {
        if self.is_multiple() && !self.is_full_range() {
            return Err(AddressError::incompatible(format!(
                "reversing the bits of segment range {}-{} does not give a range",
                self.lower, self.upper
            )));
        }
        let shift = SegInt::BITS - u32::from(self.bit_count);
        let lower = self.lower.reverse_bits() >> shift;
        let upper = self.upper.reverse_bits() >> shift;
        Ok(Segment::from_parts(
            self.bit_count,
            lower.min(upper),
            lower.max(upper),
            None,
        ))
    }

    /// Swap the two bytes of a 16-bit segment; 8-bit segments are unchanged.
    pub fn reverse_bytes(&self) -> AddressResult<Segment> {
        if self.bit_count == 8 {
            return Ok(self.with_prefix(None));
        }
        if self.is_multiple() && !self.is_full_range() {
            return Err(AddressError::incompatible(format!(
                "reversing the bytes of segment range {:#x}-{:#x} does not give a range",
                self.lower, self.upper
            )));
        }
        let swap = |v: SegInt| ((v & 0xff) << 8) | (v >> 8);
        Ok(Segment::from_parts(
            self.bit_count,
            swap(self.lower).min(swap(self.upper)),
            swap(self.lower).max(swap(self.upper)),
            None,
        ))
    }
}
