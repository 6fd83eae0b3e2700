//! The compiled sanitizer the rewriter consults for every tag and attribute.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use html::decode_entities;

use crate::config::{ALL_ELEMENTS, RemoveContents, SanitizerConfig};
use crate::error::ConfigError;
use crate::protocol::ProtocolRule;

/// Denied elements that never keep their contents, whatever the policy says.
const ALWAYS_REMOVE_CONTENTS: &[&str] = &["math", "script", "style", "svg"];

/// Tags whose contents are not parsed as markup; handler output is checked
/// for these when `escape_tagfilter` is on.
const ESCAPE_WORTHY: &[&str] = &[
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "script",
    "style",
    "textarea",
    "title",
    "xmp",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementDecision {
    Keep,
    Remove(Removal),
}

/// How a denied element leaves the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removal {
    /// Children stay in place of the removed tags.
    pub keep_contents: bool,
    /// A space stands in for each removed tag boundary.
    pub wrap_whitespace: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeDecision {
    /// Keep the attribute with this decoded, normalized value.
    Keep(String),
    Drop,
    /// The attribute is hostile enough that the whole element goes.
    RemoveElement,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ContentRemoval {
    All,
    Only(HashSet<String>),
}

/// Validated, immutable sanitization policy.
#[derive(Clone, Debug)]
pub struct Sanitizer {
    elements: HashSet<String>,
    global_attributes: HashSet<String>,
    attributes: HashMap<String, HashSet<String>>,
    protocols: HashMap<String, HashMap<String, ProtocolRule>>,
    global_classes: HashSet<String>,
    classes: HashMap<String, HashSet<String>>,
    remove_contents: ContentRemoval,
    whitespace_elements: HashSet<String>,
    allow_comments: bool,
    allow_doctype: bool,
    escape_tagfilter: bool,
}

impl Sanitizer {
    pub fn new(config: &SanitizerConfig) -> Result<Self, ConfigError> {
        let elements = names("element", &config.elements)?;

        let mut global_attributes = HashSet::new();
        let mut attributes = HashMap::new();
        for (element, allowed) in &config.attributes {
            let allowed = names("attribute", allowed)?;
            if element == ALL_ELEMENTS {
                global_attributes.extend(allowed);
            } else {
                attributes
                    .entry(name("element", element)?)
                    .or_insert_with(HashSet::new)
                    .extend(allowed);
            }
        }

        let mut protocols: HashMap<String, HashMap<String, ProtocolRule>> = HashMap::new();
        for (element, by_attribute) in &config.protocols {
            let element = name("element", element)?;
            for (attribute, entries) in by_attribute {
                let attribute = name("attribute", attribute)?;
                let rule = ProtocolRule::compile(&element, &attribute, entries)?;
                protocols.entry(element.clone()).or_default().insert(attribute, rule);
            }
        }

        let mut global_classes = HashSet::new();
        let mut classes = HashMap::new();
        for (element, allowed) in &config.classes {
            let allowed = class_names(allowed)?;
            if element == ALL_ELEMENTS {
                global_classes.extend(allowed);
            } else {
                classes
                    .entry(name("element", element)?)
                    .or_insert_with(HashSet::new)
                    .extend(allowed);
            }
        }

        let remove_contents = match &config.remove_contents {
            RemoveContents::All(true) => ContentRemoval::All,
            RemoveContents::All(false) => ContentRemoval::Only(HashSet::new()),
            RemoveContents::Elements(set) => ContentRemoval::Only(names("element", set)?),
        };

        log::debug!(
            target: "sanitizer.policy",
            "compiled policy: {} elements, {} attribute lists, {} protocol lists",
            elements.len(),
            attributes.len() + usize::from(!global_attributes.is_empty()),
            protocols.values().map(HashMap::len).sum::<usize>()
        );

        Ok(Sanitizer {
            elements,
            global_attributes,
            attributes,
            protocols,
            global_classes,
            classes,
            remove_contents,
            whitespace_elements: names("element", &config.whitespace_elements)?,
            allow_comments: config.allow_comments,
            allow_doctype: config.allow_doctype,
            escape_tagfilter: config.escape_tagfilter,
        })
    }

    pub fn allow_comments(&self) -> bool {
        self.allow_comments
    }

    pub fn allow_doctype(&self) -> bool {
        self.allow_doctype
    }

    pub fn escape_tagfilter(&self) -> bool {
        self.escape_tagfilter
    }

    pub fn allows_element(&self, tag: &str) -> bool {
        self.elements.contains(tag)
    }

    /// Whether the tag filter removes `tag` from handler output: it is
    /// escape-worthy, the filter is on, and the policy does not allow it.
    pub fn filters_tag(&self, tag: &str) -> bool {
        self.escape_tagfilter && ESCAPE_WORTHY.contains(&tag) && !self.allows_element(tag)
    }

    /// `tag` must already be lowercase, as the tokenizer reports it.
    pub fn element(&self, tag: &str) -> ElementDecision {
        if self.allows_element(tag) {
            ElementDecision::Keep
        } else {
            let removal = self.removal(tag);
            log::trace!(target: "sanitizer.policy", "remove <{tag}>: {removal:?}");
            ElementDecision::Remove(removal)
        }
    }

    /// How `tag` is removed, whether or not it is allowed. Used both for
    /// denied elements and for allowed ones forced out by a hostile attribute.
    pub fn removal(&self, tag: &str) -> Removal {
        let drop_contents = ALWAYS_REMOVE_CONTENTS.contains(&tag)
            || match &self.remove_contents {
                ContentRemoval::All => true,
                ContentRemoval::Only(set) => set.contains(tag),
            };
        Removal {
            keep_contents: !drop_contents,
            wrap_whitespace: self.whitespace_elements.contains(tag),
        }
    }

    /// Kept `iframe`s have their contents replaced with a single space.
    pub fn empties_inner_content(&self, tag: &str) -> bool {
        tag == "iframe"
    }

    /// Decide the fate of one attribute on an allowed element. `value` is the
    /// raw (still entity-encoded) value, `None` for a bare attribute.
    pub fn attribute(&self, tag: &str, name: &str, value: Option<&str>) -> AttributeDecision {
        // A comment opener inside a tag can smuggle markup past naive parsers.
        if name.starts_with("<!--") {
            log::trace!(target: "sanitizer.policy", "<{tag}> carries `{name}`, removing element");
            return AttributeDecision::RemoveElement;
        }
        let allowed = self.global_attributes.contains(name)
            || self.attributes.get(tag).is_some_and(|set| set.contains(name));
        if !allowed {
            return AttributeDecision::Drop;
        }
        let Some(raw) = value else {
            return AttributeDecision::Drop;
        };
        let decoded = decode_entities(raw);
        let value = decoded.trim_start_matches(|c: char| c.is_ascii_whitespace());
        if value.is_empty() {
            return AttributeDecision::Drop;
        }
        if let Some(rule) = self.protocols.get(tag).and_then(|by_attribute| by_attribute.get(name))
            && !rule.allows(value)
        {
            log::trace!(target: "sanitizer.policy", "<{tag} {name}> rejected protocol in `{value}`");
            return AttributeDecision::Drop;
        }
        if tag == "meta" && name == "charset" {
            return AttributeDecision::Keep("utf-8".to_string());
        }
        if name == "class" {
            return match self.filter_classes(tag, value) {
                Some(kept) => AttributeDecision::Keep(kept),
                None => AttributeDecision::Drop,
            };
        }
        AttributeDecision::Keep(value.to_string())
    }

    /// Keep only allowed class names, in source order. `None` when nothing
    /// survives. Without any class list for `tag`, every class is kept.
    fn filter_classes(&self, tag: &str, value: &str) -> Option<String> {
        let local = self.classes.get(tag);
        if self.global_classes.is_empty() && local.is_none_or(HashSet::is_empty) {
            return Some(value.to_string());
        }
        let kept: Vec<&str> = value
            .split_ascii_whitespace()
            .filter(|class| self.global_classes.contains(*class) || local.is_some_and(|set| set.contains(*class)))
            .collect();
        if kept.is_empty() {
            log::trace!(target: "sanitizer.policy", "<{tag} class> has no allowed classes in `{value}`");
            None
        } else {
            Some(kept.join(" "))
        }
    }
}

fn names<'a>(kind: &'static str, raw: impl IntoIterator<Item = &'a String>) -> Result<HashSet<String>, ConfigError> {
    raw.into_iter().map(|n| name(kind, n)).collect()
}

fn name(kind: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '<' | '>' | '/' | '=' | '"' | '\''));
    if valid {
        Ok(lowercase(trimmed).into_owned())
    } else {
        Err(ConfigError::InvalidName {
            kind,
            name: raw.to_string(),
        })
    }
}

/// Class names are case-sensitive and kept as written.
fn class_names<'a>(raw: impl IntoIterator<Item = &'a String>) -> Result<HashSet<String>, ConfigError> {
    raw.into_iter()
        .map(|class| {
            let trimmed = class.trim();
            if trimmed.is_empty() || trimmed.contains(|c: char| c.is_whitespace()) {
                Err(ConfigError::InvalidName {
                    kind: "class",
                    name: class.clone(),
                })
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

fn lowercase(s: &str) -> Cow<'_, str> {
    if s.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(s.to_ascii_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}
