use thiserror::Error;

use crate::content::{ContentType, push_content};

#[derive(Debug)]
pub(crate) struct CommentState<'i> {
    raw: &'i str,
    text: String,
    modified: bool,
    pub(crate) removed: bool,
    pub(crate) before: String,
    pub(crate) after: String,
}

impl<'i> CommentState<'i> {
    pub(crate) fn new(raw: &'i str, text: &str) -> Self {
        Self {
            raw,
            text: text.to_string(),
            modified: false,
            removed: false,
            before: String::new(),
            after: String::new(),
        }
    }

    pub(crate) fn serialize(&self, out: &mut String) {
        out.push_str(&self.before);
        if !self.removed {
            if self.modified {
                out.push_str("<!--");
                out.push_str(&self.text);
                out.push_str("-->");
            } else {
                out.push_str(self.raw);
            }
        }
        out.push_str(&self.after);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("comment text cannot contain `-->`")]
pub struct CommentTextError;

/// A comment reachable under a handler's text target.
pub struct Comment<'a, 'i> {
    state: &'a mut CommentState<'i>,
}

impl<'a, 'i> Comment<'a, 'i> {
    pub(crate) fn new(state: &'a mut CommentState<'i>) -> Self {
        Self { state }
    }

    pub fn text(&self) -> &str {
        &self.state.text
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), CommentTextError> {
        if text.contains("-->") {
            return Err(CommentTextError);
        }
        self.state.text = text.to_string();
        self.state.modified = true;
        Ok(())
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
