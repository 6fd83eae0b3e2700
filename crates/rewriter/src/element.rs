//! The element surface handlers mutate, and the state behind it.

use css::MatchElement;
use html::{StartTag, escape_attribute_value};
use thiserror::Error;

use crate::content::{ContentType, push_content};
use crate::stack::Frame;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid {kind} name `{name}`")]
pub struct InvalidNameError {
    pub kind: &'static str,
    pub name: String,
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '<' | '>' | '/' | '=' | '"' | '\''))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RemovalKind {
    /// Tags and everything between them.
    Element,
    /// Tags only; children stay in place.
    Tags,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ElementAttribute {
    pub(crate) name: String,
    /// Decoded value; empty for a bare attribute.
    pub(crate) value: String,
}

/// Everything the sanitizer and handlers decided about one start tag.
#[derive(Debug)]
pub(crate) struct ElementState {
    pub(crate) source_name: String,
    pub(crate) tag_name: String,
    pub(crate) attributes: Vec<ElementAttribute>,
    pub(crate) self_closing: bool,
    pub(crate) can_have_content: bool,
    /// The start tag must be re-serialized instead of copied from source.
    pub(crate) modified: bool,
    pub(crate) removal: Option<RemovalKind>,
    /// Removed by the sanitizer; handlers never see it.
    pub(crate) sanitized_out: bool,
    pub(crate) wrap_whitespace: bool,
    pub(crate) before: String,
    pub(crate) prepend: String,
    pub(crate) inner: Option<String>,
    pub(crate) append: String,
    pub(crate) after: String,
}

impl ElementState {
    pub(crate) fn from_token(tag: &StartTag<'_>, can_have_content: bool) -> Self {
        Self {
            source_name: tag.name.clone(),
            tag_name: tag.name.clone(),
            attributes: tag
                .attributes
                .iter()
                .map(|a| ElementAttribute {
                    name: a.name.clone(),
                    value: a.decoded_value().into_owned(),
                })
                .collect(),
            self_closing: tag.self_closing,
            can_have_content,
            modified: false,
            removal: None,
            sanitized_out: false,
            wrap_whitespace: false,
            before: String::new(),
            prepend: String::new(),
            inner: None,
            append: String::new(),
            after: String::new(),
        }
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removal.is_some()
    }

    pub(crate) fn renamed(&self) -> bool {
        self.tag_name != self.source_name
    }

    /// Children are dropped from the output.
    pub(crate) fn skips_contents(&self) -> bool {
        self.removal == Some(RemovalKind::Element) || self.inner.is_some()
    }

    pub(crate) fn serialize_start_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag_name);
        for attribute in &self.attributes {
            out.push(' ');
            out.push_str(&attribute.name);
            if !attribute.value.is_empty() {
                out.push_str("=\"");
                escape_attribute_value(&attribute.value, out);
                out.push('"');
            }
        }
        if self.self_closing {
            out.push('/');
        }
        out.push('>');
    }
}

impl MatchElement for ElementState {
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

/// A start tag being rewritten. Mutations on a removed element are ignored,
/// except [`Element::before`] and [`Element::after`].
pub struct Element<'a> {
    state: &'a mut ElementState,
    ancestors: &'a [Frame],
}

impl<'a> Element<'a> {
    pub(crate) fn new(state: &'a mut ElementState, ancestors: &'a [Frame]) -> Self {
        Self { state, ancestors }
    }

    pub fn tag_name(&self) -> &str {
        &self.state.tag_name
    }

    pub fn set_tag_name(&mut self, name: &str) -> Result<(), InvalidNameError> {
        if !valid_name(name) {
            return Err(InvalidNameError {
                kind: "tag",
                name: name.to_string(),
            });
        }
        if !self.state.is_removed() {
            self.state.tag_name = name.to_ascii_lowercase();
            self.state.modified = true;
        }
        Ok(())
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.state.attribute(&name.to_ascii_lowercase())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Attributes in source order as `(name, decoded value)`.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.state
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
    }

    /// Set `name` to `value` (unescaped). Existing attributes keep their position.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), InvalidNameError> {
        if !valid_name(name) {
            return Err(InvalidNameError {
                kind: "attribute",
                name: name.to_string(),
            });
        }
        if self.state.is_removed() {
            return Ok(());
        }
        let name = name.to_ascii_lowercase();
        match self.state.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.state.attributes.push(ElementAttribute {
                name,
                value: value.to_string(),
            }),
        }
        self.state.modified = true;
        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) {
        if self.state.is_removed() {
            return;
        }
        let name = name.to_ascii_lowercase();
        let before = self.state.attributes.len();
        self.state.attributes.retain(|a| a.name != name);
        if self.state.attributes.len() != before {
            self.state.modified = true;
        }
    }

    /// Tag names of the open elements enclosing this one, outermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> + '_ {
        self.ancestors.iter().map(Frame::tag_name)
    }

    pub fn is_self_closing(&self) -> bool {
        self.state.self_closing
    }

    /// False for void elements and self-closing tags in SVG or MathML.
    pub fn can_have_content(&self) -> bool {
        self.state.can_have_content
    }

    pub fn is_removed(&self) -> bool {
        self.state.is_removed()
    }

    pub fn before(&mut self, content: &str, content_type: ContentType) {
        push_content(&mut self.state.before, content, content_type);
    }

    /// Later calls land closer to the element.
    pub fn after(&mut self, content: &str, content_type: ContentType) {
        let mut piece = String::new();
        push_content(&mut piece, content, content_type);
        self.state.after.insert_str(0, &piece);
    }

    /// Later calls land closer to the start tag.
    pub fn prepend(&mut self, content: &str, content_type: ContentType) {
        if self.state.is_removed() || !self.state.can_have_content {
            return;
        }
        let mut piece = String::new();
        push_content(&mut piece, content, content_type);
        self.state.prepend.insert_str(0, &piece);
    }

    pub fn append(&mut self, content: &str, content_type: ContentType) {
        if self.state.is_removed() || !self.state.can_have_content {
            return;
        }
        push_content(&mut self.state.append, content, content_type);
    }

    /// Replace the element's children with `content`.
    pub fn set_inner_content(&mut self, content: &str, content_type: ContentType) {
        if self.state.is_removed() || !self.state.can_have_content {
            return;
        }
        let mut inner = String::new();
        push_content(&mut inner, content, content_type);
        self.state.prepend.clear();
        self.state.append.clear();
        self.state.inner = Some(inner);
    }

    /// Remove the element and its children.
    pub fn remove(&mut self) {
        if !self.state.is_removed() {
            self.state.removal = Some(RemovalKind::Element);
        }
    }

    /// Remove the start and end tags, keeping the children.
    pub fn remove_and_keep_content(&mut self) {
        if !self.state.is_removed() {
            self.state.removal = Some(RemovalKind::Tags);
        }
    }
}
