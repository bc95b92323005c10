//! Range list input for the command line tool.
//!
//! One entry per line, `#` starts a comment:
//! - `10.0.0.1` or `fe80::1` - a single address
//! - `10.0.0.0/24` - the whole prefix block
//! - `10.0.0.5-10.0.0.9` - an inclusive range

use crate::error::AddressError;
use crate::models::{Address, SequentialRange};
use colored::Colorize;
use regex::Regex;
use std::io::Read;
use std::net::IpAddr;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Regex for one entry: address, then an optional `/prefix` or `-upper`.
static ENTRY_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_entry_regex() -> &'static Regex {
    ENTRY_REGEX.get_or_init(|| {
        Regex::new(r"^([0-9A-Fa-f:.]+)\s*(?:/\s*(\d{1,3})|-\s*([0-9A-Fa-f:.]+))?$")
            .expect("Invalid Regex")
    })
}

/// Errors reading a range list.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("line {line}: cannot parse {text:?}")]
    Line { line: usize, text: String },

    #[error("line {line}: {source}")]
    Address {
        line: usize,
        #[source]
        source: AddressError,
    },

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse one line. Blank and comment-only lines yield `None`.
///
/// `line` is the 1-based line number used in errors.
pub fn parse_line(line: usize, text: &str) -> Result<Option<SequentialRange>, InputError> {
    let entry = text.split('#').next().unwrap_or_default().trim();
    if entry.is_empty() {
        return Ok(None);
    }
    let bad_line = || InputError::Line {
        line,
        text: entry.to_string(),
    };
    let address_error = |source: AddressError| InputError::Address { line, source };

    let caps = get_entry_regex().captures(entry).ok_or_else(bad_line)?;
    let first = parse_address(&caps[1]).ok_or_else(bad_line)?;

    let range = if let Some(prefix) = caps.get(2) {
        let prefix_len: u8 = prefix.as_str().parse().map_err(|_| bad_line())?;
        let block = first
            .to_prefix_block_len(prefix_len)
            .map_err(address_error)?;
        SequentialRange::from_section(block.section())
    } else if let Some(upper) = caps.get(3) {
        let second = parse_address(upper.as_str()).ok_or_else(bad_line)?;
        SequentialRange::new(&first, &second).map_err(address_error)?
    } else {
        SequentialRange::from_section(first.section())
    };
    log::trace!("line {line}: {entry} -> {range}");
    Ok(Some(range))
}

fn parse_address(text: &str) -> Option<Address> {
    text.parse::<IpAddr>().ok().map(Address::from)
}

/// Parse a single entry, such as a `--within` argument.
pub fn parse_range(text: &str) -> Result<SequentialRange, InputError> {
    parse_line(1, text)?.ok_or_else(|| InputError::Line {
        line: 1,
        text: text.to_string(),
    })
}

/// Parse every line of `text`.
pub fn parse_ranges(text: &str) -> Result<Vec<SequentialRange>, InputError> {
    let mut ranges = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(range) = parse_line(i + 1, line)? {
            ranges.push(range);
        }
    }
    Ok(ranges)
}

/// Read a range list from `path`, or from stdin when no path is given.
pub fn read_ranges(path: Option<&Path>) -> Result<Vec<SequentialRange>, InputError> {
    let text = match path {
        Some(path) => {
            log::debug!("read_ranges({})", path.display().to_string().on_blue());
            std::fs::read_to_string(path)?
        }
        None => {
            log::debug!("read_ranges(stdin)");
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let ranges = parse_ranges(&text)?;
    log::info!("# Got range count = {}", ranges.len());
    Ok(ranges)
}
