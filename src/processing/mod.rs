//! Address algebra and enumeration.
//!
//! This module contains the algorithms over the value model:
//! - [`set_ops`] - intersection and subtraction of sections
//! - [`join`] - merging ranges
//! - [`span`] - spanning and covering with blocks
//! - [`odometer`] / [`iter`] - lazy enumeration
//! - [`gap_finder`] - free space within a container
//! - [`overlap`] - overlapping range detection

pub mod gap_finder;
pub mod iter;
pub mod join;
pub mod odometer;
pub mod overlap;
mod set_ops;
pub mod span;

// Re-export public functions
pub use gap_finder::{find_gaps, GapRow};
pub use iter::{AddressIter, RangePrefixIter, SectionIter};
pub use join::join;
pub use odometer::{Digit, Exclusion, Odometer};
pub use overlap::{find_overlaps, log_overlaps, OverlapConflict};
pub use span::{merge_to_prefix_blocks, merge_to_sequential_blocks};
