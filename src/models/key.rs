//! Flattened, fixed-layout value keys for addresses and ranges.
//!
//! Keys carry only values (version, prefix length, segment bounds), so they
//! are usable as ordering and equality keys in external indexes. Unused
//! trailing segment slots of an IPv4 key are zero.

use super::address::Address;
use super::range::SequentialRange;
use super::section::Section;
use super::version::{IpVersion, SegInt, MAX_SEGMENT_COUNT};
use crate::error::{AddressError, AddressResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AddressKey {
    pub version: IpVersion,
    /// `(lower, upper)` per segment.
    pub segments: [(u16, u16); MAX_SEGMENT_COUNT],
    pub prefix_len: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RangeKey {
    pub version: IpVersion,
    pub lower: [u16; MAX_SEGMENT_COUNT],
    pub upper: [u16; MAX_SEGMENT_COUNT],
}

fn check_padding(version: IpVersion, used: usize, padded: impl Iterator<Item = bool>) -> AddressResult<()> {
    if padded.skip(used).any(|nonzero| nonzero) {
        return Err(AddressError::value(format!(
            "{version} key has values beyond its {used} segments"
        )));
    }
    Ok(())
}

impl Section {
    pub fn to_key(&self) -> AddressKey {
        let mut segments = [(0u16, 0u16); MAX_SEGMENT_COUNT];
        for (slot, seg) in segments.iter_mut().zip(self.segments()) {
            // segment values never exceed 16 bits
            *slot = (seg.lower() as u16, seg.upper() as u16);
        }
        AddressKey {
            version: self.version(),
            segments,
            prefix_len: self.prefix_len(),
        }
    }

    pub fn from_key(key: &AddressKey) -> AddressResult<Section> {
        let used = key.version.segment_count();
        check_padding(
            key.version,
            used,
            key.segments.iter().map(|&(lo, hi)| lo != 0 || hi != 0),
        )?;
        let ranges: Vec<(SegInt, SegInt)> = key.segments[..used]
            .iter()
            .map(|&(lo, hi)| (SegInt::from(lo), SegInt::from(hi)))
            .collect();
        Section::from_ranges(key.version, &ranges, key.prefix_len)
    }
}

impl Address {
    /// Key of the address values; the zone is not part of the key.
    pub fn to_key(&self) -> AddressKey {
        self.section().to_key()
    }

    pub fn from_key(key: &AddressKey) -> AddressResult<Address> {
        Section::from_key(key).map(Address::new)
    }
}

impl SequentialRange {
    pub fn to_key(&self) -> RangeKey {
        let mut lower = [0u16; MAX_SEGMENT_COUNT];
        let mut upper = [0u16; MAX_SEGMENT_COUNT];
        let version = self.version();
        for (slot, value) in lower.iter_mut().zip(version.split_value(self.lower_value())) {
            *slot = value as u16;
        }
        for (slot, value) in upper.iter_mut().zip(version.split_value(self.upper_value())) {
            *slot = value as u16;
        }
        RangeKey {
            version,
            lower,
            upper,
        }
    }

    pub fn from_key(key: &RangeKey) -> AddressResult<SequentialRange> {
        let version = key.version;
        let used = version.segment_count();
        check_padding(version, used, key.lower.iter().map(|&v| v != 0))?;
        check_padding(version, used, key.upper.iter().map(|&v| v != 0))?;
        let max = version.max_segment_value();
        let join = |values: &[u16]| -> AddressResult<u128> {
            if let Some(&v) = values[..used].iter().find(|&&v| SegInt::from(v) > max) {
                return Err(AddressError::value(format!(
                    "segment value {v} exceeds the {version} maximum {max}"
                )));
            }
            Ok(version.join_values(values[..used].iter().map(|&v| SegInt::from(v))))
        };
        let lower = join(&key.lower)?;
        let upper = join(&key.upper)?;
        SequentialRange::from_value_range(version, lower, upper)
    }
}
