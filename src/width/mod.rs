//! Terminal display width helpers.
//!
//! ANSI-aware width calculation so padding and hit ranges stay aligned even
//! when zone content carries escape sequences.

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

#[cfg(test)]
mod tests {
    use super::display_width;

    #[test]
    fn ignores_escape_sequences() {
        assert_eq!(display_width("\x1b[2mdim\x1b[0m"), 3);
    }

    #[test]
    fn counts_wide_glyphs() {
        assert_eq!(display_width("時計"), 4);
    }
}
