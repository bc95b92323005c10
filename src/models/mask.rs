//! Per-prefix-length mask tables and masking of segment value ranges.
//!
//! Masking (AND) or OR-ing every value of a range `[lower, upper]` with a
//! fixed mask yields a set of values that is not always contiguous.
//! [`mask_range`] and [`or_range`] compute the resulting bounds and report
//! whether the set is still a contiguous range.

use super::version::SegInt;
use lazy_static::lazy_static;

fn build_network_masks(bits: u8) -> Vec<SegInt> {
    let max: SegInt = (1 << bits) - 1;
    (0..=bits)
        .map(|prefix| {
            let host_bits = bits - prefix;
            max & !((1 << host_bits) - 1)
        })
        .collect()
}

lazy_static! {
    static ref NETWORK_MASKS_8: Vec<SegInt> = build_network_masks(8);
    static ref NETWORK_MASKS_16: Vec<SegInt> = build_network_masks(16);
}

/// Network mask of a single segment for a segment-local prefix length.
///
/// # Panics
/// * If `bits` is not 8 or 16, or `prefix_len > bits`
pub fn segment_network_mask(bits: u8, prefix_len: u8) -> SegInt {
    match bits {
        8 => NETWORK_MASKS_8[usize::from(prefix_len)],
        16 => NETWORK_MASKS_16[usize::from(prefix_len)],
        _ => panic!("unsupported segment width {bits}"),
    }
}

/// Host mask of a single segment for a segment-local prefix length.
pub fn segment_host_mask(bits: u8, prefix_len: u8) -> SegInt {
    let max: SegInt = (1 << bits) - 1;
    max ^ segment_network_mask(bits, prefix_len)
}

/// Bounds of a masked or OR-ed segment range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskedRange {
    pub lower: SegInt,
    pub upper: SegInt,
    /// False when the resulting values do not form a contiguous range;
    /// `lower`/`upper` are then just the two original bounds masked.
    pub sequential: bool,
}

impl MaskedRange {
    fn exact(lower: SegInt, upper: SegInt) -> Self {
        MaskedRange {
            lower,
            upper,
            sequential: true,
        }
    }
}

/// Apply `mask` (bitwise AND) to every value in `[lower, upper]`.
pub fn mask_range(lower: SegInt, upper: SegInt, mask: SegInt, max: SegInt) -> MaskedRange {
    if lower == upper || mask == 0 || mask == max {
        return MaskedRange::exact(lower & mask, upper & mask);
    }
    let fallback = MaskedRange {
        lower: lower & mask,
        upper: upper & mask,
        sequential: false,
    };

    // Bits above the highest differing bit are shared by every value in the range.
    let differing_bit = SegInt::BITS - 1 - (lower ^ upper).leading_zeros();
    let low_bits: SegInt = ((2u64 << differing_bit) - 1) as SegInt;
    let low_mask = mask & low_bits;
    if low_mask == 0 {
        return MaskedRange::exact(lower & mask, lower & mask);
    }
    let top_mask_bit = SegInt::BITS - 1 - low_mask.leading_zeros();
    let below_top: SegInt = (1 << top_mask_bit) - 1;
    if low_mask & below_top != below_top {
        return fallback;
    }
    if top_mask_bit == differing_bit {
        return MaskedRange::exact(lower & mask, upper & mask);
    }

    // The mask keeps only the lowest `top_mask_bit + 1` bits of the varying part,
    // so the range must reach every residue of that width.
    let modulus: SegInt = 1 << (top_mask_bit + 1);
    let half: SegInt = 1 << differing_bit;
    let lower_low = lower & low_bits;
    let upper_low = upper & low_bits;
    let covers_all = half - lower_low >= modulus
        || upper_low - half + 1 >= modulus
        || upper_low - half + 1 >= (lower_low & (modulus - 1));
    if !covers_all {
        return fallback;
    }
    let base = lower & mask & !(modulus - 1);
    MaskedRange::exact(base, base | (modulus - 1))
}

/// Apply `mask` (bitwise OR) to every value in `[lower, upper]`.
///
/// `x | m` is the complement of `!x & !m`, so this is [`mask_range`] on the
/// complemented range.
pub fn or_range(lower: SegInt, upper: SegInt, mask: SegInt, max: SegInt) -> MaskedRange {
    let inverted = mask_range(max ^ upper, max ^ lower, max ^ mask, max);
    MaskedRange {
        lower: if inverted.sequential {
            max ^ inverted.upper
        } else {
            lower | mask
        },
        upper: if inverted.sequential {
            max ^ inverted.lower
        } else {
            upper | mask
        },
        sequential: inverted.sequential,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn brute(lower: SegInt, upper: SegInt, f: impl Fn(SegInt) -> SegInt) -> (SegInt, SegInt, bool) {
        let values: BTreeSet<SegInt> = (lower..=upper).map(f).collect();
        let lo = *values.iter().next().unwrap();
        let hi = *values.iter().next_back().unwrap();
        (lo, hi, values.len() as SegInt == hi - lo + 1)
    }

    #[test]
    fn test_mask_tables() {
        assert_eq!(segment_network_mask(8, 0), 0);
        assert_eq!(segment_network_mask(8, 3), 0b1110_0000);
        assert_eq!(segment_network_mask(8, 8), 0xff);
        assert_eq!(segment_network_mask(16, 4), 0xf000);
        assert_eq!(segment_host_mask(16, 4), 0x0fff);
        assert_eq!(segment_host_mask(8, 8), 0);
    }

    #[test]
    fn test_mask_range_examples() {
        // 4-7 & 3 -> 0-3
        assert_eq!(mask_range(4, 7, 3, 255), MaskedRange::exact(0, 3));
        // 5-6 & 3 -> {1, 2}, contiguous
        assert_eq!(mask_range(5, 6, 3, 255), MaskedRange::exact(1, 2));
        // 3-4 & 3 -> {3, 0}, not contiguous
        assert!(!mask_range(3, 4, 3, 255).sequential);
        // 0-255 & 0xf0 -> multiples of 16, not contiguous
        assert!(!mask_range(0, 255, 0xf0, 255).sequential);
        // single value
        assert_eq!(mask_range(9, 9, 0xf0, 255), MaskedRange::exact(0, 0));
    }

    #[test]
    fn test_mask_range_exhaustive_small() {
        let max = 255;
        for mask in [0x01, 0x03, 0x0f, 0x1f, 0x30, 0x3f, 0x7f, 0xe0, 0xf7, 0xfe] {
            for lower in (0..=max).step_by(7) {
                for upper in (lower..=max).step_by(5) {
                    let got = mask_range(lower, upper, mask, max);
                    let (lo, hi, seq) = brute(lower, upper, |x| x & mask);
                    assert_eq!(got.sequential, seq, "{lower}-{upper} & {mask:#x}");
                    if seq {
                        assert_eq!((got.lower, got.upper), (lo, hi), "{lower}-{upper} & {mask:#x}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_or_range_exhaustive_small() {
        let max = 255;
        for mask in [0x01, 0x03, 0x0f, 0x80, 0xc0, 0xf0, 0x18] {
            for lower in (0..=max).step_by(11) {
                for upper in (lower..=max).step_by(3) {
                    let got = or_range(lower, upper, mask, max);
                    let (lo, hi, seq) = brute(lower, upper, |x| x | mask);
                    assert_eq!(got.sequential, seq, "{lower}-{upper} | {mask:#x}");
                    if seq {
                        assert_eq!((got.lower, got.upper), (lo, hi), "{lower}-{upper} | {mask:#x}");
                    }
                }
            }
        }
    }
}
