use unicode_width::UnicodeWidthChar;

/// Truncate to a display width, appending an ellipsis. Counts terminal
/// columns rather than bytes so mixed Hebrew/Latin strings never split inside
/// a character.
pub fn truncate_width(s: &str, max_width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(1)).sum();
    if total <= max_width {
        return s.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(1);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_untouched() {
        assert_eq!(truncate_width("שלום", 20), "שלום");
        assert_eq!(truncate_width("", 20), "");
    }

    #[test]
    fn test_truncate_long_string() {
        let s = "a very long english sentence that keeps going";
        let out = truncate_width(s, 20);
        assert!(out.ends_with("..."));
        assert!(out.chars().count() <= 20);
    }

    #[test]
    fn test_truncate_hebrew_on_char_boundary() {
        let s = "שלום עליכם וברוכים הבאים לשיעור";
        let out = truncate_width(s, 12);
        assert!(out.ends_with("..."));
        // Must still be valid UTF-8 slicing by construction; check content.
        assert!(out.starts_with("שלום"));
    }

}
