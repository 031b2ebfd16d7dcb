/// Escape the characters that matter inside HTML text and attributes.
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cut text to `max_len` characters, trimming trailing whitespace at the cut
/// and appending "...".
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len).collect();
    format!("{}...", cut.trim())
}

/// Render an RFC 3339 timestamp as "Jan 05, 2025 14:30"; other strings pass through.
pub fn format_timestamp(value: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_html() {
        assert_eq!(sanitize_html("a & b"), "a &amp; b");
        assert_eq!(sanitize_html(r#"<a href="/x">"#), "&lt;a href=&quot;&#x2F;x&quot;&gt;");
        assert_eq!(sanitize_html("plain"), "plain");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("hello world again", 6), "hello...");
        assert_eq!(truncate_text("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2025-01-05T14:30:00+00:00"), "Jan 05, 2025 14:30");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
