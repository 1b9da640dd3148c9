//! Pluralization utilities.

/// Return "s" suffix for plural counts
///
/// - `plural_s(0)` -> `"s"` (0 files)
/// - `plural_s(1)` -> `""` (1 file)
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format count with noun, handling pluralization
///
/// - `plural_count(1, "alias")` -> `"1 alias"`
/// - `plural_count(3, "emote")` -> `"3 emotes"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_s(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "emote"), "0 emotes");
        assert_eq!(plural_count(1, "emote"), "1 emote");
        assert_eq!(plural_count(2, "failure"), "2 failures");
    }
}
