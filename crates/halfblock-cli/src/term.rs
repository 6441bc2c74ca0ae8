//! Terminal color capability probing.

use std::env;

use halfblock::ColorLevel;

/// Detects the color depth the current terminal supports, from the
/// environment alone.
///
/// A `COLORTERM` value containing `truecolor` or `24bit` wins; otherwise a
/// `TERM` value containing `256color` selects the 256-color palette, and any
/// other non-dumb terminal falls back to 16 colors. Returns `None` when
/// `TERM` is unset or `dumb`, meaning no colored output can be assumed.
pub fn detect_color_level() -> Option<ColorLevel> {
    let colorterm = env::var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return Some(ColorLevel::TrueColor);
    }

    let term = env::var("TERM").unwrap_or_default();
    if term.is_empty() || term == "dumb" {
        return None;
    }
    if term.contains("256color") {
        return Some(ColorLevel::Ansi256);
    }

    Some(ColorLevel::Ansi16)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var driven detection is covered by setting the variables for the
    // duration of a single test; tests run in one process, so they must not
    // race on the same variables. Serialize by keeping them in one test.
    #[test]
    fn test_detect_color_level_from_env() {
        env::set_var("COLORTERM", "truecolor");
        env::set_var("TERM", "xterm");
        assert_eq!(detect_color_level(), Some(ColorLevel::TrueColor));

        // Compound values occur in the wild; a substring match must win.
        env::set_var("COLORTERM", "24bit;truecolor");
        assert_eq!(detect_color_level(), Some(ColorLevel::TrueColor));

        env::set_var("COLORTERM", "");
        env::set_var("TERM", "xterm-256color");
        assert_eq!(detect_color_level(), Some(ColorLevel::Ansi256));

        env::set_var("TERM", "xterm");
        assert_eq!(detect_color_level(), Some(ColorLevel::Ansi16));

        env::set_var("TERM", "dumb");
        assert_eq!(detect_color_level(), None);

        env::remove_var("TERM");
        assert_eq!(detect_color_level(), None);
    }
}
