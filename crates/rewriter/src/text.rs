use html::TextType;

use crate::content::{ContentType, push_content, push_inert_text, push_unwrapped_text};

#[derive(Debug)]
pub(crate) struct TextState<'i> {
    raw: &'i str,
    text_type: TextType,
    unwrap_raw_text: bool,
    /// Write source `<` as `&lt;`.
    pub(crate) escape_lt: bool,
    /// Serialized replacement; `None` keeps the source text.
    replacement: Option<Replacement>,
    pub(crate) removed: bool,
    pub(crate) before: String,
    pub(crate) after: String,
}

#[derive(Debug)]
struct Replacement {
    text: String,
    content_type: ContentType,
}

impl<'i> TextState<'i> {
    pub(crate) fn new(raw: &'i str, text_type: TextType, unwrap_raw_text: bool) -> Self {
        Self {
            raw,
            text_type,
            unwrap_raw_text,
            escape_lt: false,
            replacement: None,
            removed: false,
            before: String::new(),
            after: String::new(),
        }
    }

    pub(crate) fn serialize(&self, out: &mut String) {
        out.push_str(&self.before);
        if !self.removed {
            match &self.replacement {
                Some(replacement) => push_content(out, &replacement.text, replacement.content_type),
                None if self.unwrap_raw_text => push_unwrapped_text(out, self.raw, self.text_type),
                None if self.escape_lt => push_inert_text(out, self.raw),
                None => out.push_str(self.raw),
            }
        }
        out.push_str(&self.after);
    }
}

/// One run of text between markup. Replacements are visible to handlers
/// that run later on the same chunk.
pub struct TextChunk<'a, 'i> {
    state: &'a mut TextState<'i>,
}

impl<'a, 'i> TextChunk<'a, 'i> {
    pub(crate) fn new(state: &'a mut TextState<'i>) -> Self {
        Self { state }
    }

    /// Current text: the source text as written, or the latest replacement.
    pub fn as_str(&self) -> &str {
        match &self.state.replacement {
            Some(replacement) => &replacement.text,
            None => self.state.raw,
        }
    }

    /// Content model the text was scanned in (`Data`, `RcData`, `RawText`, ...).
    pub fn text_type(&self) -> TextType {
        self.state.text_type
    }

    pub fn replace(&mut self, content: &str, content_type: ContentType) {
        self.state.replacement = Some(Replacement {
            text: content.to_string(),
            content_type,
        });
        self.state.removed = false;
    }

    pub fn before(&mut self, content: &str, content_type: ContentType) {
        push_content(&mut self.state.before, content, content_type);
    }

    pub fn after(&mut self, content: &str, content_type: ContentType) {
        let mut piece = String::new();
        push_content(&mut piece, content, content_type);
        self.state.after.insert_str(0, &piece);
    }

    pub fn remove(&mut self) {
        self.state.removed = true;
    }

    pub fn is_removed(&self) -> bool {
        self.state.removed
    }
}
