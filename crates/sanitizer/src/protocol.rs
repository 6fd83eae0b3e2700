//! URL scheme extraction and protocol allow-lists.

use std::collections::BTreeSet;

use url::{ParseError, Url};

use crate::config::RELATIVE;
use crate::error::ConfigError;

/// How a URL-valued attribute resolves for protocol checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlKind {
    /// No scheme: the URL only means something against a base.
    Relative,
    /// Lowercased scheme.
    Scheme(String),
    /// Neither a parseable absolute URL nor a plain relative reference.
    Invalid,
}

/// Classify a decoded attribute value.
///
/// Parsing follows the URL standard, which drops tab, newline and carriage
/// return anywhere and trims C0 controls and spaces at the ends, so
/// `jav&#x09;ascript:` and ` &#14; javascript:` still read as `javascript`.
/// A relative reference whose first segment holds a `:` is not treated as
/// relative.
pub fn classify_url(value: &str) -> UrlKind {
    match Url::parse(value) {
        Ok(url) => UrlKind::Scheme(url.scheme().to_string()),
        Err(ParseError::RelativeUrlWithoutBase) if !colon_in_first_segment(value) => UrlKind::Relative,
        Err(_) => UrlKind::Invalid,
    }
}

fn colon_in_first_segment(value: &str) -> bool {
    let first = value.split(['/', '?', '#']).next().unwrap_or_default();
    first.contains(':')
}

/// Allowed schemes for one element attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolRule {
    schemes: BTreeSet<String>,
    relative: bool,
}

impl ProtocolRule {
    pub fn compile(element: &str, attribute: &str, entries: &[String]) -> Result<Self, ConfigError> {
        let mut rule = ProtocolRule::default();
        for entry in entries {
            let entry = entry.trim();
            match entry {
                RELATIVE | "relative" => rule.relative = true,
                ":all" | "all" => {
                    return Err(ConfigError::AllInProtocolList {
                        element: element.to_string(),
                        attribute: attribute.to_string(),
                    });
                }
                scheme => {
                    let lower = scheme.to_ascii_lowercase();
                    // Special schemes such as `http` only parse with a host.
                    if classify_url(&format!("{lower}://host")) != UrlKind::Scheme(lower.clone()) {
                        return Err(ConfigError::InvalidProtocol {
                            element: element.to_string(),
                            attribute: attribute.to_string(),
                            protocol: scheme.to_string(),
                        });
                    }
                    rule.schemes.insert(lower);
                }
            }
        }
        Ok(rule)
    }

    pub fn allows(&self, value: &str) -> bool {
        match classify_url(value) {
            UrlKind::Relative => self.relative,
            UrlKind::Scheme(scheme) => self.schemes.contains(&scheme),
            UrlKind::Invalid => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(entries: &[&str]) -> ProtocolRule {
        let entries: Vec<String> = entries.iter().map(|s| s.to_string()).collect();
        ProtocolRule::compile("a", "href", &entries).expect("valid protocol list")
    }

    #[test]
    fn classifies_schemes_and_relative_urls() {
        assert_eq!(classify_url("https://x"), UrlKind::Scheme("https".into()));
        assert_eq!(classify_url("JavaScript:alert(1)"), UrlKind::Scheme("javascript".into()));
        assert_eq!(classify_url("/path:with:colons"), UrlKind::Relative);
        assert_eq!(classify_url("somepage#fn:1"), UrlKind::Relative);
        assert_eq!(classify_url("?q=a:b"), UrlKind::Relative);
        assert_eq!(classify_url("pants"), UrlKind::Relative);
        assert_eq!(classify_url(":javascript:alert(1)"), UrlKind::Invalid);
        assert_eq!(classify_url("javascript    :alert(1)"), UrlKind::Invalid);
        assert_eq!(classify_url("https://exa mple.com"), UrlKind::Invalid);
    }

    #[test]
    fn strips_whitespace_obfuscation_before_extracting_the_scheme() {
        assert_eq!(classify_url("jav\tascript:alert(1)"), UrlKind::Scheme("javascript".into()));
        assert_eq!(classify_url("jav\nascript:alert(1)"), UrlKind::Scheme("javascript".into()));
        assert_eq!(classify_url(" \u{e}  javascript:alert(1)"), UrlKind::Scheme("javascript".into()));
    }

    #[test]
    fn rule_checks_are_case_insensitive() {
        let https = rule(&["https"]);
        assert!(https.allows("https://example.com"));
        assert!(https.allows("HTTPS://example.com"));
        assert!(!https.allows("javascript:alert(1)"));
        assert!(!https.allows("JavaScript:alert(1)"));
        assert!(!https.allows("/relative"));
    }

    #[test]
    fn relative_sentinel() {
        let relative = rule(&["http", ":relative"]);
        assert!(relative.allows("/foo"));
        assert!(relative.allows("#fn1"));
        assert!(relative.allows("somepage#fn:1"));
        assert!(!relative.allows("fn:1"));
    }

    #[test]
    fn all_is_rejected_in_protocol_lists() {
        let err = ProtocolRule::compile("a", "href", &[":all".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::AllInProtocolList { .. }), "got: {err}");
    }

    #[test]
    fn malformed_schemes_are_rejected() {
        let err = ProtocolRule::compile("a", "href", &["ht tp".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProtocol { .. }), "got: {err}");
    }
}
