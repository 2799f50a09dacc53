//! Terminal control sequences emitted by the renderer and the streamer.

/// Reset all SGR attributes.
pub const RESET: &str = "\x1b[0m";

/// Hide the cursor (DECTCEM off).
pub const HIDE_CURSOR: &str = "\x1b[?25l";

/// Show the cursor (DECTCEM on).
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Erase the visible screen and move the cursor home.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Erase the visible screen, erase scrollback, then move the cursor home.
pub const FULL_CLEAR: &str = "\x1b[2J\x1b[3J\x1b[H";

/// Bright red foreground.
pub const RED: &str = "\x1b[91m";
/// Bright green foreground.
pub const GREEN: &str = "\x1b[92m";
/// Bright yellow foreground.
pub const YELLOW: &str = "\x1b[93m";
/// Bright blue foreground.
pub const BLUE: &str = "\x1b[94m";
/// Bright magenta foreground.
pub const MAGENTA: &str = "\x1b[95m";

/// Preamble written once when a stream starts.
pub fn preamble() -> String {
    format!("{HIDE_CURSOR}{CLEAR_SCREEN}")
}

/// Final output written when a stream ends, restoring the terminal.
pub fn teardown() -> String {
    format!("{SHOW_CURSOR}{CLEAR_SCREEN}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_hides_cursor_before_clear() {
        assert_eq!(preamble(), "\x1b[?25l\x1b[2J\x1b[H");
    }

    #[test]
    fn test_teardown_shows_cursor_before_clear() {
        assert_eq!(teardown(), "\x1b[?25h\x1b[2J\x1b[H");
    }

    #[test]
    fn test_full_clear_erases_scrollback() {
        assert!(FULL_CLEAR.contains("\x1b[3J"));
        assert!(FULL_CLEAR.ends_with("\x1b[H"));
    }
}
