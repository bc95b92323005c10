//! Output formatting for range data.
//!
//! This module handles formatting and outputting results:
//! - [`csv`] - CSV output formatting
//! - [`json`] - JSON records carrying value keys
//! - [`terminal`] - Terminal output helpers

mod csv;
mod json;
mod terminal;

pub use csv::{print_blocks, print_gaps, print_overlaps, print_ranges};
pub use json::{
    blocks_to_json, gaps_to_json, overlaps_to_json, ranges_to_json, BlockRecord, GapRecord,
    OverlapRecord, RangeRecord,
};
pub use terminal::format_field;
