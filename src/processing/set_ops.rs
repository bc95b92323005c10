//! Intersection and subtraction of sections and addresses.

use crate::error::AddressResult;
use crate::models::{Address, SegInt, Section};

impl Section {
    /// The values common to both sections, or `None` if they are disjoint.
    ///
    /// The result carries the longer of the two prefix lengths, or none if
    /// either section is unprefixed.
    pub fn intersect(&self, other: &Section) -> AddressResult<Option<Section>> {
        self.check_same_size(other)?;
        let prefix_len = match (self.prefix_len(), other.prefix_len()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        if other.contains(self) {
            return Ok(Some(self.with_prefix(prefix_len)));
        }
        if self.contains(other) {
            return Ok(Some(other.with_prefix(prefix_len)));
        }
        if !self.overlaps(other) {
            return Ok(None);
        }
        let bounds: Vec<_> = self
            .segments()
            .iter()
            .zip(other.segments())
            .map(|(a, b)| {
                if b.contains(a) {
                    (a.lower(), a.upper())
                } else if a.contains(b) {
                    (b.lower(), b.upper())
                } else {
                    (a.lower().max(b.lower()), a.upper().min(b.upper()))
                }
            })
            .collect();
        Ok(Some(Section::from_bounds(self.version(), bounds, prefix_len)))
    }

    /// The values of `self` not in `other`, as disjoint sections.
    ///
    /// When `self` is prefixed, each result gets the shortest prefix length
    /// at which it is a block, but never shorter than the prefix of `self`.
    pub fn subtract(&self, other: &Section) -> AddressResult<Vec<Section>> {
        self.check_same_size(other)?;
        if !self.is_multiple() {
            return Ok(if other.contains(self) {
                Vec::new()
            } else {
                vec![self.clone()]
            });
        }
        if !self.overlaps(other) {
            return Ok(vec![self.clone()]);
        }

        let count = self.segment_count();
        let mut intersections: Vec<(SegInt, SegInt)> = Vec::with_capacity(count);
        let mut sections = Vec::new();
        for (i, (seg, other_seg)) in self.segments().iter().zip(other.segments()).enumerate() {
            let (lower, upper) = (seg.lower(), seg.upper());
            let (other_lower, other_upper) = (other_seg.lower(), other_seg.upper());
            if other_lower <= lower {
                if other_upper >= upper {
                    intersections.push((lower, upper));
                    continue;
                }
                sections.push(self.diff_section(&intersections, i, (other_upper + 1, upper)));
                intersections.push((lower, other_upper));
            } else {
                sections.push(self.diff_section(&intersections, i, (lower, other_lower - 1)));
                if other_upper < upper {
                    sections.push(self.diff_section(&intersections, i, (other_upper + 1, upper)));
                    intersections.push((other_lower, other_upper));
                } else {
                    intersections.push((other_lower, upper));
                }
            }
        }
        log::trace!("{self} minus {other} gives {} sections", sections.len());

        let Some(own_prefix) = self.prefix_len() else {
            return Ok(sections);
        };
        let bit_count = self.bit_count();
        Ok(sections
            .into_iter()
            .map(|section| {
                let block_prefix = section.min_prefix_len_for_block();
                if block_prefix == bit_count {
                    section
                } else {
                    section.with_prefix(Some(block_prefix.max(own_prefix)))
                }
            })
            .collect())
    }

    /// Section made of the intersections so far, then `split` at `index`,
    /// then the remaining segments of `self`.
    fn diff_section(
        &self,
        intersections: &[(SegInt, SegInt)],
        index: usize,
        split: (SegInt, SegInt),
    ) -> Section {
        let bounds = intersections
            .iter()
            .copied()
            .chain(std::iter::once(split))
            .chain(
                self.segments()[index + 1..]
                    .iter()
                    .map(|s| (s.lower(), s.upper())),
            )
            .collect::<Vec<_>>();
        Section::from_bounds(self.version(), bounds, None)
    }
}

impl Address {
    pub fn intersect(&self, other: &Address) -> AddressResult<Option<Address>> {
        Ok(self
            .section()
            .intersect(other.section())?
            .map(|s| self.wrap(s)))
    }

    pub fn subtract(&self, other: &Address) -> AddressResult<Vec<Address>> {
        Ok(self
            .section()
            .subtract(other.section())?
            .into_iter()
            .map(|s| self.wrap(s))
            .collect())
    }
}
