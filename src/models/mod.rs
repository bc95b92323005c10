//! Address value model.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Segment`] - one fixed-width division of an address
//! - [`Section`] - a fixed-length sequence of segments with a prefix length
//! - [`Address`] - a section plus an optional IPv6 zone
//! - [`SequentialRange`] - a contiguous interval between two addresses
//! - [`AddressKey`] and [`RangeKey`] - flattened value keys

mod address;
mod key;
mod mask;
mod memo;
mod range;
mod section;
mod segment;
mod version;

// Re-export public types
pub use address::Address;
pub use key::{AddressKey, RangeKey};
pub use mask::{mask_range, or_range, segment_host_mask, segment_network_mask, MaskedRange};
pub use memo::MemoCell;
pub use range::SequentialRange;
pub use section::{MaskMode, Section};
pub use segment::Segment;
pub use version::{IpVersion, SegInt, MAX_SEGMENT_COUNT};

pub(crate) use section::segment_prefix_len;
