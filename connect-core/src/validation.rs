//! Input sanitization and canonical limits
//!
//! Display names and titles come from untrusted clients; both are stripped
//! of control characters, whitespace-collapsed and length-capped before they
//! reach the store.

/// Maximum room title length
pub const ROOM_TITLE_MAX: usize = 120;

/// Maximum participant display-name length
pub const DISPLAY_NAME_MAX: usize = 80;

/// Sanitize a display name: strip control characters, collapse runs of
/// whitespace to single spaces, trim, cap length. Returns None when nothing
/// usable remains.
#[must_use]
pub fn sanitize_display_name(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return None;
    }

    Some(truncate_chars(&cleaned, DISPLAY_NAME_MAX))
}

/// Sanitize an optional room title: trim and cap. Empty becomes None.
#[must_use]
pub fn sanitize_title(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(truncate_chars(trimmed, ROOM_TITLE_MAX))
}

/// Cap a string at `max` characters on a char boundary
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(sanitize_display_name("Ada\u{0007}\u{001b} Lovelace"), Some("Ada Lovelace".to_string()));
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(sanitize_display_name("  Grace \t\n  Hopper  "), Some("Grace Hopper".to_string()));
    }

    #[test]
    fn test_rejects_empty_and_control_only() {
        assert_eq!(sanitize_display_name(""), None);
        assert_eq!(sanitize_display_name("   "), None);
        assert_eq!(sanitize_display_name("\u{0000}\u{0008}"), None);
    }

    #[test]
    fn test_caps_length_on_char_boundary() {
        let long = "й".repeat(DISPLAY_NAME_MAX + 20);
        let name = sanitize_display_name(&long).unwrap();
        assert_eq!(name.chars().count(), DISPLAY_NAME_MAX);
    }

    #[test]
    fn test_title_trim_and_empty() {
        assert_eq!(sanitize_title(Some("  standup  ")), Some("standup".to_string()));
        assert_eq!(sanitize_title(Some("   ")), None);
        assert_eq!(sanitize_title(None), None);
    }
}
