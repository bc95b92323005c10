//! Lazy iterators over sections, addresses and sequential ranges.
//!
//! All of them drive an [`Odometer`] and turn each digit tuple back into a
//! section according to a [`Layout`].

use super::odometer::{Digit, Exclusion, Odometer};
use crate::models::{
    segment_host_mask, segment_prefix_len, Address, IpVersion, SegInt, Section, SequentialRange,
};
use num_bigint::BigUint;

/// Which segments are iterated and how each tuple maps back to segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Every segment iterated; single values.
    Values,
    /// The first `digits` segments iterated; the rest keep their source bounds.
    Blocks { digits: usize },
    /// Network segments iterated, the boundary segment in steps of
    /// `1 << shift`; host bits full range.
    PrefixBlocks { digits: usize, shift: u8 },
    /// As `PrefixBlocks`, but each block is clipped to the source values.
    Prefixes { digits: usize, shift: u8 },
}

impl Layout {
    fn prefix(version: IpVersion, prefix_len: u8, clipped: bool) -> Layout {
        let bits = version.bits_per_segment();
        let prefix_len = prefix_len.min(version.bit_count());
        let digits = prefix_len.div_ceil(bits);
        let shift = digits * bits - prefix_len;
        let digits = usize::from(digits);
        if clipped {
            Layout::Prefixes { digits, shift }
        } else {
            Layout::PrefixBlocks { digits, shift }
        }
    }

    fn digit_count(&self, segment_count: usize) -> usize {
        match *self {
            Layout::Values => segment_count,
            Layout::Blocks { digits }
            | Layout::PrefixBlocks { digits, .. }
            | Layout::Prefixes { digits, .. } => digits,
        }
    }

    fn shift(&self) -> u8 {
        match *self {
            Layout::PrefixBlocks { shift, .. } | Layout::Prefixes { shift, .. } => shift,
            _ => 0,
        }
    }
}

/// Iterator over the sub-sections of a section or range.
pub struct SectionIter {
    version: IpVersion,
    layout: Layout,
    source: Vec<(SegInt, SegInt)>,
    prefix_len: Option<u8>,
    odometer: Odometer,
}

impl SectionIter {
    fn new(
        version: IpVersion,
        source: Vec<(SegInt, SegInt)>,
        layout: Layout,
        sequential: bool,
        prefix_len: Option<u8>,
        exclude: Option<Exclusion>,
    ) -> Self {
        let max = version.max_segment_value();
        let digit_count = layout.digit_count(source.len());
        let shift = layout.shift();
        let digits: Vec<Digit> = source[..digit_count]
            .iter()
            .enumerate()
            .map(|(i, &(lower, upper))| {
                if i + 1 == digit_count {
                    Digit::new(lower >> shift, upper >> shift, max >> shift)
                } else {
                    Digit::new(lower, upper, max)
                }
            })
            .collect();
        let mut odometer = if sequential {
            Odometer::sequential(digits)
        } else {
            Odometer::product(digits)
        };
        if let Some(exclude) = exclude {
            odometer = odometer.with_exclusion(exclude);
        }
        SectionIter {
            version,
            layout,
            source,
            prefix_len,
            odometer,
        }
    }

    /// Range iteration counts through a contiguous interval rather than a
    /// product of segment ranges.
    fn for_range(range: &SequentialRange, layout: Layout, prefix_len: Option<u8>) -> Self {
        let version = range.version();
        let source = version
            .split_value(range.lower_value())
            .into_iter()
            .zip(version.split_value(range.upper_value()))
            .collect();
        Self::new(version, source, layout, true, prefix_len, None)
    }

    pub fn has_next(&mut self) -> bool {
        self.odometer.has_next()
    }

    fn emit(&self, tuple: &[SegInt]) -> Section {
        let bounds: Vec<(SegInt, SegInt)> = match self.layout {
            Layout::Values => tuple.iter().map(|&v| (v, v)).collect(),
            Layout::Blocks { digits } => tuple
                .iter()
                .map(|&v| (v, v))
                .chain(self.source[digits..].iter().copied())
                .collect(),
            Layout::PrefixBlocks { digits, shift } | Layout::Prefixes { digits, shift } => {
                let clipped = matches!(self.layout, Layout::Prefixes { .. });
                let host: SegInt = (1 << shift) - 1;
                let max = self.version.max_segment_value();
                let mut bounds = Vec::with_capacity(self.source.len());
                for (i, &v) in tuple.iter().enumerate() {
                    if i + 1 < digits {
                        bounds.push((v, v));
                        continue;
                    }
                    let (lower, upper) = (v << shift, (v << shift) | host);
                    if clipped {
                        let (source_lower, source_upper) = self.source[i];
                        bounds.push((lower.max(source_lower), upper.min(source_upper)));
                    } else {
                        bounds.push((lower, upper));
                    }
                }
                bounds.extend(
                    self.source[digits..]
                        .iter()
                        .map(|&bound| if clipped { bound } else { (0, max) }),
                );
                bounds
            }
        };
        Section::from_bounds(self.version, bounds, self.prefix_len)
    }
}

impl Iterator for SectionIter {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        let tuple = self.odometer.next()?;
        Some(self.emit(&tuple))
    }
}

/// [`SectionIter`] yielding addresses that carry the source zone.
pub struct AddressIter {
    inner: SectionIter,
    origin: Address,
}

impl AddressIter {
    pub fn has_next(&mut self) -> bool {
        self.inner.has_next()
    }
}

impl Iterator for AddressIter {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        self.inner.next().map(|s| self.origin.wrap(s))
    }
}

/// The parts of a range sharing each prefix value.
pub struct RangePrefixIter {
    blocks: AddressIter,
    range: SequentialRange,
}

impl Iterator for RangePrefixIter {
    type Item = SequentialRange;

    fn next(&mut self) -> Option<SequentialRange> {
        let range = &self.range;
        self.blocks
            .by_ref()
            .find_map(|block| SequentialRange::from_section(block.section()).intersect(range))
    }
}

impl Section {
    /// Every single value, most significant segment varying slowest.
    pub fn iter(&self) -> SectionIter {
        SectionIter::new(
            self.version(),
            self.bounds().collect(),
            Layout::Values,
            false,
            self.prefix_len(),
            None,
        )
    }

    /// Iterate the first `segment_count` segments, keeping the rest as ranges.
    pub fn block_iter(&self, segment_count: usize) -> SectionIter {
        let digits = segment_count.min(self.segment_count());
        SectionIter::new(
            self.version(),
            self.bounds().collect(),
            Layout::Blocks { digits },
            false,
            self.prefix_len(),
            None,
        )
    }

    /// The prefix blocks of length `prefix_len` covering this section.
    ///
    /// Prefix lengths beyond the bit count are clamped.
    pub fn prefix_block_iter(&self, prefix_len: u8) -> SectionIter {
        let prefix_len = prefix_len.min(self.bit_count());
        SectionIter::new(
            self.version(),
            self.bounds().collect(),
            Layout::prefix(self.version(), prefix_len, false),
            false,
            Some(prefix_len),
            None,
        )
    }

    /// The values of this section grouped by prefix of length `prefix_len`.
    pub fn prefix_iter(&self, prefix_len: u8) -> SectionIter {
        let prefix_len = prefix_len.min(self.bit_count());
        SectionIter::new(
            self.version(),
            self.bounds().collect(),
            Layout::prefix(self.version(), prefix_len, true),
            false,
            Some(prefix_len),
            None,
        )
    }

    /// Index of the last segment that is not full range. Segments after it
    /// are full, so a block fixing the segments before it is sequential.
    fn sequential_block_index(&self) -> usize {
        self.segments()
            .iter()
            .rposition(|s| !s.is_full_range())
            .unwrap_or(0)
    }

    /// The largest sequential blocks making up this section, ascending.
    pub fn sequential_block_iter(&self) -> SectionIter {
        self.block_iter(self.sequential_block_index())
    }

    pub fn sequential_block_count(&self) -> BigUint {
        self.segments()[..self.sequential_block_index()]
            .iter()
            .fold(BigUint::from(1u32), |acc, s| acc * s.count())
    }

    /// Every single value except those with a zero host; unprefixed
    /// sections and full-length prefixes exclude nothing.
    pub fn non_zero_host_iter(&self) -> SectionIter {
        let Some(prefix_len) = self.prefix_len().filter(|&p| p < self.bit_count()) else {
            return self.iter();
        };
        let bits = self.version().bits_per_segment();
        let host_masks: Vec<Option<SegInt>> = (0..self.segment_count())
            .map(|i| {
                segment_prefix_len(bits, Some(prefix_len), i).map(|sp| segment_host_mask(bits, sp))
            })
            .collect();
        let exclude: Exclusion = Box::new(move |tuple: &[SegInt]| {
            tuple
                .iter()
                .zip(&host_masks)
                .all(|(&v, mask)| mask.map_or(true, |m| v & m == 0))
        });
        SectionIter::new(
            self.version(),
            self.bounds().collect(),
            Layout::Values,
            false,
            self.prefix_len(),
            Some(exclude),
        )
    }
}

impl Address {
    pub fn iter(&self) -> AddressIter {
        self.iter_of(self.section().iter())
    }

    pub fn block_iter(&self, segment_count: usize) -> AddressIter {
        self.iter_of(self.section().block_iter(segment_count))
    }

    pub fn prefix_block_iter(&self, prefix_len: u8) -> AddressIter {
        self.iter_of(self.section().prefix_block_iter(prefix_len))
    }

    pub fn prefix_iter(&self, prefix_len: u8) -> AddressIter {
        self.iter_of(self.section().prefix_iter(prefix_len))
    }

    pub fn sequential_block_iter(&self) -> AddressIter {
        self.iter_of(self.section().sequential_block_iter())
    }

    pub fn non_zero_host_iter(&self) -> AddressIter {
        self.iter_of(self.section().non_zero_host_iter())
    }

    fn iter_of(&self, inner: SectionIter) -> AddressIter {
        AddressIter {
            inner,
            origin: self.clone(),
        }
    }
}

impl SequentialRange {
    /// Every address of the range in ascending order.
    pub fn iter(&self) -> AddressIter {
        AddressIter {
            inner: SectionIter::for_range(self, Layout::Values, None),
            origin: self.lower().clone(),
        }
    }

    /// Every prefix block of length `prefix_len` that overlaps the range.
    pub fn prefix_block_iter(&self, prefix_len: u8) -> AddressIter {
        let version = self.version();
        let prefix_len = prefix_len.min(version.bit_count());
        AddressIter {
            inner: SectionIter::for_range(
                self,
                Layout::prefix(version, prefix_len, false),
                Some(prefix_len),
            ),
            origin: self.lower().clone(),
        }
    }

    /// The range split at every prefix boundary of length `prefix_len`.
    pub fn prefix_iter(&self, prefix_len: u8) -> RangePrefixIter {
        RangePrefixIter {
            blocks: self.prefix_block_iter(prefix_len),
            range: self.clone(),
        }
    }
}
