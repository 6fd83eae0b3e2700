//! Content inserted by handlers and how it is serialized.

use html::{TextType, escape_text};

/// How inserted content is treated on output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentType {
    /// Escaped so it always reads as text.
    #[default]
    Text,
    /// Trusted markup, written verbatim.
    Html,
}

pub(crate) fn push_content(out: &mut String, content: &str, content_type: ContentType) {
    match content_type {
        ContentType::Text => escape_text(content, out),
        ContentType::Html => out.push_str(content),
    }
}

/// Re-express raw text from `text_type` so it reads the same as ordinary
/// document text once its enclosing element is gone.
pub(crate) fn push_unwrapped_text(out: &mut String, raw: &str, text_type: TextType) {
    match text_type {
        TextType::Data => out.push_str(raw),
        // Character references already mean what they say in RCDATA.
        TextType::RcData => {
            for ch in raw.chars() {
                match ch {
                    '<' => out.push_str("&lt;"),
                    '>' => out.push_str("&gt;"),
                    ch => out.push(ch),
                }
            }
        }
        TextType::RawText | TextType::ScriptData | TextType::PlainText => escape_text(raw, out),
    }
}

/// Copy document text, escaping only `<` so it cannot open markup later.
/// Character references are left as written.
pub(crate) fn push_inert_text(out: &mut String, raw: &str) {
    let mut pieces = raw.split('<');
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for piece in pieces {
        out.push_str("&lt;");
        out.push_str(piece);
    }
}
