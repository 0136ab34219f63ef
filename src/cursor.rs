//! Terminal cursor helpers for composing ANSI sequences.
//!
//! The renderer addresses cells through these instead of hand-rolling escape
//! codes at every call site. Functions return owned `String`s so callers can
//! extend them or write directly to stdout/stderr.

const CSI: &str = "\x1b[";

/// Move the cursor to an absolute 1-based `row` and `column`.
pub fn move_to(row: u16, column: u16) -> String {
    format!("{CSI}{row};{column}H")
}

/// Move the cursor horizontally to the provided 1-based column on the current row.
pub fn move_to_column(column: u16) -> String {
    format!("{CSI}{column}G")
}

/// Hide the cursor.
pub fn hide() -> &'static str {
    "\x1b[?25l"
}

/// Show the cursor.
pub fn show() -> &'static str {
    "\x1b[?25h"
}

/// Clear from the cursor to the end of the line.
pub fn clear_to_line_end() -> &'static str {
    "\x1b[K"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_position_is_well_formed() {
        assert_eq!(move_to(3, 5), "\x1b[3;5H");
    }

    #[test]
    fn column_move_is_well_formed() {
        assert_eq!(move_to_column(7), "\x1b[7G");
    }
}
