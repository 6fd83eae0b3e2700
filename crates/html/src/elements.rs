//! Element content-model tables the tokenizer and rewriter agree on.

use crate::token::TextType;

pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "basefont"
            | "bgsound"
            | "br"
            | "col"
            | "embed"
            | "frame"
            | "hr"
            | "image"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Roots of foreign (SVG/MathML) content, where raw-text elements parse as ordinary tags.
pub fn is_foreign_root(name: &str) -> bool {
    matches!(name, "svg" | "math")
}

/// Text mode the tokenizer enters after an HTML start tag named `name`.
pub fn text_type_after_start_tag(name: &str) -> Option<TextType> {
    match name {
        "title" | "textarea" => Some(TextType::RcData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => Some(TextType::RawText),
        "script" => Some(TextType::ScriptData),
        "plaintext" => Some(TextType::PlainText),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_elements_are_classified() {
        assert_eq!(text_type_after_start_tag("title"), Some(TextType::RcData));
        assert_eq!(text_type_after_start_tag("style"), Some(TextType::RawText));
        assert_eq!(text_type_after_start_tag("script"), Some(TextType::ScriptData));
        assert_eq!(text_type_after_start_tag("div"), None);
    }

    #[test]
    fn void_elements() {
        assert!(is_void_element("br"));
        assert!(is_void_element("img"));
        assert!(!is_void_element("div"));
        assert!(!is_void_element("script"));
    }
}
