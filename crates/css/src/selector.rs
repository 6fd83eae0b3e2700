//! The handler-facing selector: an element target, a text target, and tags
//! whose text is excluded from the text target.

use serde::Deserialize;

use crate::error::SelectorError;
use crate::matching::MatchElement;
use crate::syntax::SelectorList;

/// Uncompiled selector as it appears in configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SelectorSpec {
    #[serde(default)]
    pub match_element: Option<String>,
    #[serde(default, alias = "match_text")]
    pub match_text_within: Option<String>,
    #[serde(default)]
    pub ignore_text_within: Vec<String>,
}

/// A compiled, validated selector. Immutable once built.
#[derive(Clone, Debug)]
pub struct Selector {
    element: Option<SelectorList>,
    text_within: Option<SelectorList>,
    ignore_text_within: Vec<String>,
}

impl Selector {
    pub fn builder() -> SelectorBuilder {
        SelectorBuilder::default()
    }

    /// Selector that only targets elements.
    pub fn element(css: &str) -> Result<Self, SelectorError> {
        Self::builder().match_element(css).build()
    }

    /// Selector that only targets text inside matching elements.
    pub fn text_within(css: &str) -> Result<Self, SelectorError> {
        Self::builder().match_text_within(css).build()
    }

    pub fn compile(spec: &SelectorSpec) -> Result<Self, SelectorError> {
        let element = spec.match_element.as_deref().map(SelectorList::parse).transpose()?;
        let text_within = spec.match_text_within.as_deref().map(SelectorList::parse).transpose()?;
        if element.is_none() && text_within.is_none() {
            return Err(SelectorError::MissingTarget);
        }
        let ignore_text_within = spec
            .ignore_text_within
            .iter()
            .map(|tag| {
                let tag = tag.trim();
                let valid = !tag.is_empty()
                    && tag.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':');
                if valid {
                    Ok(tag.to_ascii_lowercase())
                } else {
                    Err(SelectorError::InvalidIgnoreTag(tag.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selector {
            element,
            text_within,
            ignore_text_within,
        })
    }

    pub fn match_element(&self) -> Option<&SelectorList> {
        self.element.as_ref()
    }

    pub fn match_text_within(&self) -> Option<&SelectorList> {
        self.text_within.as_ref()
    }

    pub fn ignore_text_within(&self) -> &[String] {
        &self.ignore_text_within
    }

    pub fn matches_element<E, A>(&self, element: &E, ancestors: &[A]) -> bool
    where
        E: MatchElement + ?Sized,
        A: MatchElement,
    {
        self.element.as_ref().is_some_and(|list| list.matches(element, ancestors))
    }

    /// Whether text directly or indirectly inside `element` is a text target.
    pub fn opens_text_scope<E, A>(&self, element: &E, ancestors: &[A]) -> bool
    where
        E: MatchElement + ?Sized,
        A: MatchElement,
    {
        self.text_within.as_ref().is_some_and(|list| list.matches(element, ancestors))
    }

    pub fn ignores_text_within(&self, tag_name: &str) -> bool {
        self.ignore_text_within.iter().any(|tag| tag == tag_name)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SelectorBuilder {
    spec: SelectorSpec,
}

impl SelectorBuilder {
    pub fn match_element(mut self, css: &str) -> Self {
        self.spec.match_element = Some(css.to_string());
        self
    }

    pub fn match_text_within(mut self, css: &str) -> Self {
        self.spec.match_text_within = Some(css.to_string());
        self
    }

    pub fn ignore_text_within<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.ignore_text_within.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<Selector, SelectorError> {
        Selector::compile(&self.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_a_target() {
        let err = Selector::builder().ignore_text_within(["pre"]).build().unwrap_err();
        assert_eq!(err, SelectorError::MissingTarget);
    }

    #[test]
    fn empty_element_pattern_is_rejected() {
        assert_eq!(Selector::element("").unwrap_err(), SelectorError::Empty);
    }

    #[test]
    fn invalid_css_is_rejected_at_construction() {
        let err = Selector::element("a[href=]").unwrap_err();
        assert!(matches!(err, SelectorError::Syntax { .. }), "got: {err:?}");
    }

    #[test]
    fn both_targets_compile() {
        let selector = Selector::builder()
            .match_element("strong")
            .match_text_within("div, p")
            .ignore_text_within(["CODE", "pre"])
            .build()
            .expect("valid selector");
        assert!(selector.match_element().is_some());
        assert!(selector.match_text_within().is_some());
        assert!(selector.ignores_text_within("code"));
        assert!(!selector.ignores_text_within("p"));
    }

    #[test]
    fn ignore_entries_must_be_tag_names() {
        let err = Selector::builder()
            .match_text_within("p")
            .ignore_text_within(["pre code"])
            .build()
            .unwrap_err();
        assert_eq!(err, SelectorError::InvalidIgnoreTag("pre code".to_string()));
    }

    #[test]
    fn deserializes_from_configuration() {
        let spec: SelectorSpec =
            serde_json::from_str(r#"{"match_text": "div", "ignore_text_within": ["pre"]}"#).expect("valid json");
        let selector = Selector::compile(&spec).expect("valid selector");
        assert!(selector.match_text_within().is_some());

        let wrong_type = serde_json::from_str::<SelectorSpec>(r#"{"match_element": 42}"#);
        assert!(wrong_type.is_err());
        let unknown = serde_json::from_str::<SelectorSpec>(r#"{"match": "div"}"#);
        assert!(unknown.is_err());
    }
}
