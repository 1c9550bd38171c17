//! String normalization for identity matching.
//!
//! Both forms keep only ASCII alphanumerics: extracted names are compared on
//! their latin/digit skeleton, so decorations like `×`, `॥`, or clan glyphs
//! never affect a match.

/// Lowercase, with every non-alphanumeric run collapsed to a single space.
///
/// `"Pro_Gamer  X"` becomes `"pro gamer x"`.
pub fn normalize_loose(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, with everything that is not ASCII alphanumeric stripped.
///
/// `"Pro_Gamer  X"` becomes `"progamerx"`.
pub fn normalize_strict(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_collapses_separators() {
        assert_eq!(normalize_loose("Pro_Gamer  X"), "pro gamer x");
        assert_eq!(normalize_loose("TSM-Entity.Ninja"), "tsm entity ninja");
        assert_eq!(normalize_loose("  GodLike  "), "godlike");
    }

    #[test]
    fn test_strict_strips_everything() {
        assert_eq!(normalize_strict("Pro_Gamer  X"), "progamerx");
        assert_eq!(normalize_strict("TSM-Entity.Ninja"), "tsmentityninja");
        assert_eq!(normalize_strict("T5M 2.0"), "t5m20");
    }

    #[test]
    fn test_non_ascii_is_dropped() {
        assert_eq!(normalize_strict("×Ninja×"), "ninja");
        assert_eq!(normalize_loose("٭Team٭Elite"), "team elite");
        assert_eq!(normalize_strict("भारत"), "");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(normalize_loose(""), "");
        assert_eq!(normalize_strict("___"), "");
        assert_eq!(normalize_loose("!!!"), "");
    }
}
