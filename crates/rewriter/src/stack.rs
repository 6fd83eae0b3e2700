//! Open elements. The stack is the only structure the rewriter keeps; there
//! is no tree, so ancestor queries are linear scans.

use css::MatchElement;

use crate::element::{ElementAttribute, ElementState, RemovalKind};

/// One open element, pushed at its start tag and popped at its end tag.
#[derive(Debug)]
pub(crate) struct Frame {
    /// Name the closing tag will carry in the source.
    pub(crate) source_name: String,
    pub(crate) tag_name: String,
    pub(crate) attributes: Vec<ElementAttribute>,
    pub(crate) removal: Option<RemovalKind>,
    /// Write `</tag_name>` instead of copying the source end tag.
    pub(crate) rewrite_end_tag: bool,
    pub(crate) append: String,
    pub(crate) after: String,
    pub(crate) wrap_whitespace: bool,
    /// Raw text inside must be escaped because the element itself is gone.
    pub(crate) unwrap_raw_text: bool,
    pub(crate) foreign_root: bool,
    /// Handlers whose text scope this frame opened or suppressed.
    pub(crate) scope_changes: Vec<ScopeChange>,
}

impl Frame {
    pub(crate) fn open(state: ElementState) -> Self {
        let rewrite_end_tag = state.renamed() || state.modified;
        Self {
            source_name: state.source_name,
            tag_name: state.tag_name,
            attributes: state.attributes,
            removal: state.removal,
            rewrite_end_tag,
            append: state.append,
            after: state.after,
            wrap_whitespace: state.wrap_whitespace,
            unwrap_raw_text: false,
            foreign_root: false,
            scope_changes: Vec::new(),
        }
    }

    /// Frame inside content that is being dropped; only tracked to find its end tag.
    pub(crate) fn skipped(name: &str) -> Self {
        Self {
            source_name: name.to_string(),
            tag_name: name.to_string(),
            attributes: Vec::new(),
            removal: Some(RemovalKind::Element),
            rewrite_end_tag: false,
            append: String::new(),
            after: String::new(),
            wrap_whitespace: false,
            unwrap_raw_text: false,
            foreign_root: false,
            scope_changes: Vec::new(),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }
}

impl MatchElement for Frame {
    fn local_name(&self) -> &str {
        &self.tag_name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScopeChange {
    pub(crate) handler: usize,
    pub(crate) opens: bool,
    pub(crate) ignores: bool,
}

/// Per-handler count of open frames that activate or suppress its text target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextScope {
    active: usize,
    ignored: usize,
}

impl TextScope {
    pub(crate) fn is_active(self) -> bool {
        self.active > 0 && self.ignored == 0
    }

    pub(crate) fn enter(&mut self, change: ScopeChange) {
        self.active += usize::from(change.opens);
        self.ignored += usize::from(change.ignores);
    }

    pub(crate) fn leave(&mut self, change: ScopeChange) {
        self.active -= usize::from(change.opens);
        self.ignored -= usize::from(change.ignores);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_wins_over_any_number_of_opens() {
        let mut scope = TextScope::default();
        let open = ScopeChange {
            handler: 0,
            opens: true,
            ignores: false,
        };
        let ignore = ScopeChange {
            handler: 0,
            opens: false,
            ignores: true,
        };
        assert!(!scope.is_active());
        scope.enter(open);
        scope.enter(open);
        assert!(scope.is_active());
        scope.enter(ignore);
        assert!(!scope.is_active());
        scope.leave(ignore);
        scope.leave(open);
        assert!(scope.is_active());
        scope.leave(open);
        assert!(!scope.is_active());
    }
}
