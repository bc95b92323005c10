//! CSV output formatting for ranges, blocks, gaps and overlaps.

use crate::models::{Address, SequentialRange};
use crate::processing::{GapRow, OverlapConflict};

use super::terminal::{format_field, note};

/// Print joined ranges as CSV to stdout.
pub fn print_ranges(ranges: &[SequentialRange]) {
    log::info!("#Start print_ranges() count = {}", ranges.len());
    println!(r#" "cnt",               "lower",               "upper",     "addresses""#);
    for (i, range) in ranges.iter().enumerate() {
        println!("{}", range_row(i, range));
    }
}

/// Print prefix or sequential blocks as CSV to stdout.
pub fn print_blocks(blocks: &[Address]) {
    log::info!("#Start print_blocks() count = {}", blocks.len());
    println!(r#" "cnt",                   "block",     "addresses""#);
    for (i, block) in blocks.iter().enumerate() {
        println!("{}", block_row(i, block));
    }
}

/// Print the free ranges of `container` as CSV to stdout, one row per block.
pub fn print_gaps(container: &SequentialRange, rows: &[GapRow]) {
    log::info!("#Start print_gaps() within {container}, gap count = {}", rows.len());
    println!(r#" "cnt",     "gap",                   "block",     "addresses""#);
    let mut j = 0;
    for (i, row) in rows.iter().enumerate() {
        for block in &row.blocks {
            println!("{}", gap_row(j, i, block));
            j += 1;
        }
    }
    if rows.is_empty() {
        println!("{}", note(format!("no free space within {container}")));
    }
}

/// Print overlapping range pairs as CSV to stdout.
pub fn print_overlaps(conflicts: &[OverlapConflict]) {
    log::info!("#Start print_overlaps() count = {}", conflicts.len());
    println!(r#" "first", "second",                                    "overlap",     "addresses""#);
    for conflict in conflicts {
        println!("{}", overlap_row(conflict));
    }
}

fn range_row(i: usize, range: &SequentialRange) -> String {
    format!(
        "{j},{lower},{upper},{count}",
        j = format_field(i, 6),
        lower = format_field(range.lower(), 22),
        upper = format_field(range.upper(), 22),
        count = format_field(range.count(), 14),
    )
}

fn block_row(i: usize, block: &Address) -> String {
    format!(
        "{j},{block},{count}",
        j = format_field(i, 6),
        block = format_field(block, 26),
        count = format_field(block.count(), 14),
    )
}

fn gap_row(j: usize, gap: usize, block: &Address) -> String {
    format!(
        "{j},{gap},{block},{count}",
        j = format_field(j, 6),
        gap = format_field(format!("gap_{gap}"), 8),
        block = format_field(block, 26),
        count = format_field(block.count(), 14),
    )
}

fn overlap_row(conflict: &OverlapConflict) -> String {
    format!(
        "{first},{second},{overlap},{count}",
        first = format_field(conflict.first_index, 8),
        second = format_field(conflict.second_index, 8),
        overlap = format_field(&conflict.overlap, 46),
        count = format_field(conflict.overlap.count(), 14),
    )
}
