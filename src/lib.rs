//! IP address section, segment and range algebra.
//!
//! - [`models`] - segments, sections, addresses, sequential ranges and keys
//! - [`processing`] - set operations, spans, enumeration and summary tooling
//! - [`input`] / [`output`] / [`cli`] - the `subnet-algebra` command line tool

pub mod cli;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod processing;

pub use error::{AddressError, AddressResult};
pub use models::{Address, AddressKey, IpVersion, MaskMode, RangeKey, Section, Segment, SequentialRange};
pub use processing::{
    find_gaps, find_overlaps, join, merge_to_prefix_blocks, merge_to_sequential_blocks,
};
