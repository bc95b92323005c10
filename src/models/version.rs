//! IP version discriminant and the per-version address layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer type holding a single segment value (8 or 16 bits wide).
pub type SegInt = u32;

/// Maximum number of segments in any version (IPv6).
pub const MAX_SEGMENT_COUNT: usize = 8;

/// IP version of a section, address or range.
///
/// The version fixes the layout: IPv4 is 4 segments of 8 bits,
/// IPv6 is 8 segments of 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Number of segments in a full address.
    pub const fn segment_count(self) -> usize {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 8,
        }
    }

    /// Bit width of one segment.
    pub const fn bits_per_segment(self) -> u8 {
        match self {
            IpVersion::V4 => 8,
            IpVersion::V6 => 16,
        }
    }

    /// Total bit width of an address.
    pub const fn bit_count(self) -> u8 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    /// Number of bytes in an address.
    pub const fn byte_count(self) -> usize {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 16,
        }
    }

    pub const fn max_segment_value(self) -> SegInt {
        match self {
            IpVersion::V4 => 0xff,
            IpVersion::V6 => 0xffff,
        }
    }

    /// Largest address value of this version.
    pub const fn max_value(self) -> u128 {
        match self {
            IpVersion::V4 => u32::MAX as u128,
            IpVersion::V6 => u128::MAX,
        }
    }

    /// Version for an address of `len` bytes.
    pub fn from_byte_count(len: usize) -> Option<IpVersion> {
        match len {
            4 => Some(IpVersion::V4),
            16 => Some(IpVersion::V6),
            _ => None,
        }
    }

    /// Network mask value for a prefix length (leading ones, then zeros).
    pub fn network_mask_value(self, prefix_len: u8) -> u128 {
        let max = self.max_value();
        let host_bits = u32::from(self.bit_count().saturating_sub(prefix_len));
        max ^ self.host_mask_value_bits(host_bits)
    }

    /// Host mask value for a prefix length (leading zeros, then ones).
    pub fn host_mask_value(self, prefix_len: u8) -> u128 {
        let host_bits = u32::from(self.bit_count().saturating_sub(prefix_len));
        self.host_mask_value_bits(host_bits)
    }

    fn host_mask_value_bits(self, host_bits: u32) -> u128 {
        if host_bits == 0 {
            0
        } else {
            self.max_value() >> (u32::from(self.bit_count()) - host_bits)
        }
    }

    /// Split a full address value into segment values, most significant first.
    pub fn split_value(self, value: u128) -> Vec<SegInt> {
        let bits = u32::from(self.bits_per_segment());
        let count = self.segment_count();
        let seg_max = u128::from(self.max_segment_value());
        (0..count)
            .map(|i| {
                let shift = (count - 1 - i) as u32 * bits;
                ((value >> shift) & seg_max) as SegInt
            })
            .collect()
    }

    /// Join segment values, most significant first, into a full address value.
    pub fn join_values<I: IntoIterator<Item = SegInt>>(self, values: I) -> u128 {
        let bits = u32::from(self.bits_per_segment());
        values
            .into_iter()
            .fold(0u128, |acc, v| (acc << bits) | u128::from(v))
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => write!(f, "IPv4"),
            IpVersion::V6 => write!(f, "IPv6"),
        }
    }
}
