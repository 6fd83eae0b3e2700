//! Built-in policies, from most to least restrictive.
//!
//! Presets are plain `const` data; [`Preset::config`] materializes an owned
//! [`SanitizerConfig`] that can be merged with overrides.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{RemoveContents, SanitizerConfig};

type AttributeTable = &'static [(&'static str, &'static [&'static str])];
type ProtocolTable = &'static [(&'static str, &'static str, &'static [&'static str])];

#[derive(Clone, Copy, Debug)]
pub struct Preset {
    pub name: &'static str,
    pub elements: &'static [&'static str],
    pub attributes: AttributeTable,
    pub protocols: ProtocolTable,
    pub remove_contents: &'static [&'static str],
    pub whitespace_elements: &'static [&'static str],
    pub allow_comments: bool,
    pub allow_doctype: bool,
}

impl Preset {
    pub fn config(&self) -> SanitizerConfig {
        let strings = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<BTreeSet<_>>();
        let attributes = self
            .attributes
            .iter()
            .map(|(element, names)| (element.to_string(), strings(names)))
            .collect();
        let mut protocols: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for (element, attribute, schemes) in self.protocols {
            protocols
                .entry(element.to_string())
                .or_default()
                .insert(attribute.to_string(), schemes.iter().map(|s| s.to_string()).collect());
        }
        SanitizerConfig {
            elements: strings(self.elements),
            attributes,
            protocols,
            classes: BTreeMap::new(),
            remove_contents: RemoveContents::Elements(strings(self.remove_contents)),
            whitespace_elements: strings(self.whitespace_elements),
            allow_comments: self.allow_comments,
            allow_doctype: self.allow_doctype,
            escape_tagfilter: true,
        }
    }
}

const REMOVE_CONTENTS: &[&str] = &[
    "iframe", "math", "noembed", "noframes", "noscript", "plaintext", "script", "style", "svg", "xmp",
];

const WHITESPACE_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "li", "nav", "ol", "p", "pre", "section", "ul",
];

/// Strips every element.
pub const DEFAULT: Preset = Preset {
    name: "default",
    elements: &[],
    attributes: &[],
    protocols: &[],
    remove_contents: REMOVE_CONTENTS,
    whitespace_elements: WHITESPACE_ELEMENTS,
    allow_comments: false,
    allow_doctype: false,
};

/// Inline emphasis only.
pub const RESTRICTED: Preset = Preset {
    name: "restricted",
    elements: &["b", "em", "i", "strong", "u"],
    ..DEFAULT
};

/// Inline formatting, links and lists.
pub const BASIC: Preset = Preset {
    name: "basic",
    elements: &[
        "a", "abbr", "b", "blockquote", "br", "cite", "code", "dd", "dfn", "dl", "dt", "em", "i", "kbd",
        "li", "mark", "ol", "p", "pre", "q", "s", "samp", "small", "strike", "strong", "sub", "sup",
        "time", "u", "ul", "var",
    ],
    attributes: &[
        ("a", &["href"]),
        ("abbr", &["title"]),
        ("blockquote", &["cite"]),
        ("dfn", &["title"]),
        ("q", &["cite"]),
        ("time", &["datetime", "pubdate"]),
    ],
    protocols: &[
        ("a", "href", &["ftp", "http", "https", "mailto", ":relative"]),
        ("blockquote", "cite", &["http", "https", ":relative"]),
        ("q", "cite", &["http", "https", ":relative"]),
    ],
    ..DEFAULT
};

/// Document structure, tables and images on top of [`BASIC`].
pub const RELAXED: Preset = Preset {
    name: "relaxed",
    elements: &[
        "a", "abbr", "address", "article", "aside", "b", "bdi", "bdo", "blockquote", "body", "br",
        "caption", "cite", "code", "col", "colgroup", "data", "dd", "del", "dfn", "div", "dl", "dt",
        "em", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
        "hgroup", "hr", "html", "i", "img", "ins", "kbd", "li", "main", "mark", "nav", "ol", "p", "pre",
        "q", "rp", "rt", "ruby", "s", "samp", "section", "small", "span", "strike", "strong", "style",
        "sub", "summary", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "time", "title", "tr",
        "u", "ul", "var", "wbr",
    ],
    attributes: &[
        (
            ":all",
            &["class", "dir", "hidden", "id", "lang", "style", "tabindex", "title", "translate"],
        ),
        ("a", &["href", "hreflang", "name", "rel"]),
        ("abbr", &["title"]),
        ("blockquote", &["cite"]),
        ("col", &["span", "width"]),
        ("colgroup", &["span", "width"]),
        ("data", &["value"]),
        ("del", &["cite", "datetime"]),
        ("dfn", &["title"]),
        ("img", &["align", "alt", "border", "height", "src", "srcset", "width"]),
        ("ins", &["cite", "datetime"]),
        ("li", &["value"]),
        ("ol", &["reversed", "start", "type"]),
        ("q", &["cite"]),
        ("style", &["media", "scoped", "type"]),
        (
            "table",
            &[
                "align", "bgcolor", "border", "cellpadding", "cellspacing", "frame", "rules", "sortable",
                "summary", "width",
            ],
        ),
        ("td", &["abbr", "align", "axis", "colspan", "headers", "rowspan", "valign", "width"]),
        (
            "th",
            &["abbr", "align", "axis", "colspan", "headers", "rowspan", "scope", "sorted", "valign", "width"],
        ),
        ("time", &["datetime", "pubdate"]),
        ("ul", &["type"]),
    ],
    protocols: &[
        ("a", "href", &["ftp", "http", "https", "mailto", ":relative"]),
        ("blockquote", "cite", &["http", "https", ":relative"]),
        ("img", "src", &["http", "https", ":relative"]),
        ("q", "cite", &["http", "https", ":relative"]),
    ],
    ..DEFAULT
};

pub const ALL: [Preset; 4] = [DEFAULT, RESTRICTED, BASIC, RELAXED];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Sanitizer;

    #[test]
    fn every_preset_compiles() {
        for preset in ALL {
            Sanitizer::new(&preset.config()).unwrap_or_else(|err| panic!("{}: {err}", preset.name));
        }
    }

    #[test]
    fn presets_widen_in_order() {
        let restricted = RESTRICTED.config().elements;
        let basic = BASIC.config().elements;
        let relaxed = RELAXED.config().elements;
        assert!(DEFAULT.config().elements.is_empty());
        assert!(restricted.is_subset(&basic));
        assert!(basic.is_subset(&relaxed));
    }

    #[test]
    fn preset_tables_are_sorted_and_unique() {
        for preset in ALL {
            assert!(
                preset.elements.windows(2).all(|w| w[0] < w[1]),
                "{} elements out of order",
                preset.name
            );
        }
        assert!(REMOVE_CONTENTS.windows(2).all(|w| w[0] < w[1]));
        assert!(WHITESPACE_ELEMENTS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn config_round_trips_through_merge() {
        let merged = BASIC
            .config()
            .merged(&serde_json::json!({"allow_comments": true}))
            .expect("merge keeps the preset valid");
        assert!(merged.allow_comments);
        assert_eq!(merged.elements, BASIC.config().elements);
        assert_eq!(merged.protocols, BASIC.config().protocols);
    }
}
