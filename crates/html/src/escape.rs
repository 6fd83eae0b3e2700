//! Escaping for content inserted as text.

/// Escape `&`, `<` and `>` for use in a text run.
pub fn escape_text(s: &str, out: &mut String) {
    escape_with(s, out, false);
}

/// Escape a value for a double-quoted attribute; also encodes `"`.
pub fn escape_attribute_value(s: &str, out: &mut String) {
    escape_with(s, out, true);
}

fn escape_with(s: &str, out: &mut String, quotes: bool) {
    let bytes = s.as_bytes();
    let mut copy_start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let replacement = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' if quotes => "&quot;",
            _ => continue,
        };
        out.push_str(&s[copy_start..i]);
        out.push_str(replacement);
        copy_start = i + 1;
    }
    out.push_str(&s[copy_start..]);
}
