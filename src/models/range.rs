//! Sequential address ranges and their interval algebra.

use super::address::Address;
use super::section::Section;
use super::version::IpVersion;
use crate::error::{AddressError, AddressResult};
use num_bigint::BigUint;
use std::cmp::Ordering;
use std::fmt;

/// A contiguous interval of addresses `[lower, upper]`.
///
/// Both bounds are single-valued and unprefixed. The interval need not be
/// aligned to any prefix block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequentialRange {
    version: IpVersion,
    lower_value: u128,
    upper_value: u128,
    lower: Address,
    upper: Address,
}

impl SequentialRange {
    /// Range from the lowest value of either address to the highest value of
    /// either; the argument order does not matter.
    pub fn new(first: &Address, second: &Address) -> AddressResult<SequentialRange> {
        if first.version() != second.version() {
            return Err(AddressError::size_mismatch(
                first.version().segment_count(),
                second.version().segment_count(),
            ));
        }
        let lower = first.lower_value().min(second.lower_value());
        let upper = first.upper_value().max(second.upper_value());
        Ok(Self::from_values(first.version(), lower, upper))
    }

    /// Range between two address values.
    pub fn from_value_range(
        version: IpVersion,
        lower: u128,
        upper: u128,
    ) -> AddressResult<SequentialRange> {
        if upper > version.max_value() {
            return Err(AddressError::value(format!(
                "value {upper:#x} exceeds the {version} address space"
            )));
        }
        if lower > upper {
            return Err(AddressError::value(format!(
                "range lower bound {lower:#x} exceeds upper bound {upper:#x}"
            )));
        }
        Ok(Self::from_values(version, lower, upper))
    }

    /// Unchecked constructor; `lower <= upper <= version.max_value()`.
    pub(crate) fn from_values(version: IpVersion, lower: u128, upper: u128) -> SequentialRange {
        debug_assert!(lower <= upper && upper <= version.max_value());
        let bound = |value| Address::new(Section::from_value_bounds(version, value, value, None));
        SequentialRange {
            version,
            lower_value: lower,
            upper_value: upper,
            lower: bound(lower),
            upper: bound(upper),
        }
    }

    /// The range spanned by a section, from its lowest to its highest value.
    pub fn from_section(section: &Section) -> SequentialRange {
        Self::from_values(
            section.version(),
            section.lower_value(),
            section.upper_value(),
        )
    }

    pub fn version(&self) -> IpVersion {
        self.version
    }

    pub fn lower(&self) -> &Address {
        &self.lower
    }

    pub fn upper(&self) -> &Address {
        &self.upper
    }

    pub fn lower_value(&self) -> u128 {
        self.lower_value
    }

    pub fn upper_value(&self) -> u128 {
        self.upper_value
    }

    pub fn is_multiple(&self) -> bool {
        self.lower_value != self.upper_value
    }

    pub fn count(&self) -> BigUint {
        BigUint::from(self.upper_value - self.lower_value) + 1u32
    }

    pub fn contains_value(&self, value: u128) -> bool {
        self.lower_value <= value && value <= self.upper_value
    }

    /// Whether every value of `address` lies in the range.
    pub fn contains(&self, address: &Address) -> bool {
        address.version() == self.version
            && self.lower_value <= address.lower_value()
            && address.upper_value() <= self.upper_value
    }

    pub fn contains_range(&self, other: &SequentialRange) -> bool {
        other.version == self.version
            && self.lower_value <= other.lower_value
            && other.upper_value <= self.upper_value
    }

    pub fn overlaps(&self, other: &SequentialRange) -> bool {
        other.version == self.version
            && self.lower_value <= other.upper_value
            && other.lower_value <= self.upper_value
    }

    /// Whether the two ranges overlap or `other` starts right after `self`
    /// ends (or the reverse).
    pub fn is_adjacent_or_overlapping(&self, other: &SequentialRange) -> bool {
        if other.version != self.version {
            return false;
        }
        let touches = |a: &SequentialRange, b: &SequentialRange| {
            a.upper_value.checked_add(1) == Some(b.lower_value)
        };
        self.overlaps(other) || touches(self, other) || touches(other, self)
    }

    pub fn intersect(&self, other: &SequentialRange) -> Option<SequentialRange> {
        if !self.overlaps(other) {
            return None;
        }
        if self.contains_range(other) {
            return Some(other.clone());
        }
        if other.contains_range(self) {
            return Some(self.clone());
        }
        Some(Self::from_values(
            self.version,
            self.lower_value.max(other.lower_value),
            self.upper_value.min(other.upper_value),
        ))
    }

    /// The range from the lowest to the highest bound of both, including any
    /// gap between them; `None` for different versions.
    pub fn extend(&self, other: &SequentialRange) -> Option<SequentialRange> {
        if other.version != self.version {
            return None;
        }
        match (
            self.lower_value.cmp(&other.lower_value),
            self.upper_value.cmp(&other.upper_value),
        ) {
            (Ordering::Greater, Ordering::Less) | (Ordering::Equal, Ordering::Less) => {
                Some(other.clone())
            }
            (Ordering::Less | Ordering::Equal, Ordering::Greater | Ordering::Equal) => {
                Some(self.clone())
            }
            _ => Some(Self::from_values(
                self.version,
                self.lower_value.min(other.lower_value),
                self.upper_value.max(other.upper_value),
            )),
        }
    }

    /// The union of both ranges when it is itself a range.
    pub fn join_to(&self, other: &SequentialRange) -> Option<SequentialRange> {
        if self.is_adjacent_or_overlapping(other) {
            self.extend(other)
        } else {
            None
        }
    }

    /// The values of `self` not in `other`: zero, one or two ranges.
    pub fn subtract(&self, other: &SequentialRange) -> Vec<SequentialRange> {
        if !self.overlaps(other) {
            return vec![self.clone()];
        }
        let mut result = Vec::with_capacity(2);
        if self.lower_value < other.lower_value {
            result.push(Self::from_values(
                self.version,
                self.lower_value,
                other.lower_value - 1,
            ));
        }
        if other.upper_value < self.upper_value {
            result.push(Self::from_values(
                self.version,
                other.upper_value + 1,
                self.upper_value,
            ));
        }
        result
    }
}

/// Orders by version, then lower bound, then upper bound.
impl Ord for SequentialRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then(self.lower_value.cmp(&other.lower_value))
            .then(self.upper_value.cmp(&other.upper_value))
    }
}

impl PartialOrd for SequentialRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SequentialRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.lower, self.upper)
    }
}
