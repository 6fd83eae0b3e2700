//! The sanitizer's pass over each start tag, run before any user handler,
//! and the tag filter applied to handler output.

use html::StartTag;
use sanitizer::{AttributeDecision, ElementDecision, Removal, Sanitizer};

use crate::element::{ElementAttribute, ElementState, RemovalKind};

pub(crate) fn sanitize_element(sanitizer: &Sanitizer, tag: &StartTag<'_>, state: &mut ElementState) {
    if let ElementDecision::Remove(removal) = sanitizer.element(&tag.name) {
        sanitize_out(state, removal);
        return;
    }

    let mut kept = Vec::with_capacity(tag.attributes.len());
    for attribute in &tag.attributes {
        let raw = attribute.value.as_ref().map(|v| v.raw);
        match sanitizer.attribute(&tag.name, &attribute.name, raw) {
            AttributeDecision::Keep(value) => kept.push(ElementAttribute {
                name: attribute.name.clone(),
                value,
            }),
            AttributeDecision::Drop => {}
            AttributeDecision::RemoveElement => {
                sanitize_out(state, sanitizer.removal(&tag.name));
                return;
            }
        }
    }
    state.attributes = kept;
    // Kept tags are always written in canonical form.
    state.modified = true;
    if sanitizer.empties_inner_content(&tag.name) && state.can_have_content {
        state.inner = Some(" ".to_string());
    }
}

/// Remove an escape-worthy tag the policy denies; anything else is left alone.
pub(crate) fn filter_element(sanitizer: &Sanitizer, name: &str, state: &mut ElementState) {
    if sanitizer.filters_tag(name) {
        log::trace!(target: "rewriter.dispatch", "tag filter removes <{name}>");
        sanitize_out(state, sanitizer.removal(name));
    }
}

fn sanitize_out(state: &mut ElementState, removal: Removal) {
    state.removal = Some(if removal.keep_contents {
        RemovalKind::Tags
    } else {
        RemovalKind::Element
    });
    state.sanitized_out = true;
    state.wrap_whitespace = removal.wrap_whitespace;
}
