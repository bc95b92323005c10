//! Terminal output utilities.

use colored::Colorize;
use std::fmt::Display;

/// Format a value as a quoted, right-aligned field.
///
/// Values wider than `width` are kept whole.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

/// A `#NOTE#` comment line, highlighted for the terminal.
pub(crate) fn note(message: impl Display) -> String {
    format!("#{}# {message}", "NOTE".on_red())
}
