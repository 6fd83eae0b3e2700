use sanitizer::{AttributeDecision, ConfigError, ElementDecision, RemoveContents, Sanitizer, SanitizerConfig, presets};
use serde_json::json;

const FORUM_POLICY: &str = r#"
elements = ["a", "b", "blockquote", "p"]
remove_contents = ["script", "style"]
whitespace_elements = ["blockquote", "p"]
allow_comments = false

[attributes]
":all" = ["title"]
a = ["href", "rel"]

[protocols.a]
href = ["https", "mailto", ":relative"]
"#;

fn forum() -> Sanitizer {
    let config: SanitizerConfig = toml::from_str(FORUM_POLICY).expect("policy parses");
    Sanitizer::new(&config).expect("policy compiles")
}

#[test]
fn toml_policy_loads() {
    let config: SanitizerConfig = toml::from_str(FORUM_POLICY).expect("policy parses");
    assert_eq!(config.elements.len(), 4);
    assert!(matches!(config.remove_contents, RemoveContents::Elements(ref names) if names.contains("style")));
    assert!(config.allow_doctype, "unset flags keep their defaults");
}

#[test]
fn toml_policy_decisions() {
    let sanitizer = forum();
    assert_eq!(sanitizer.element("a"), ElementDecision::Keep);
    assert!(matches!(sanitizer.element("div"), ElementDecision::Remove(r) if r.keep_contents));
    assert!(matches!(sanitizer.element("style"), ElementDecision::Remove(r) if !r.keep_contents));
    assert_eq!(
        sanitizer.attribute("a", "href", Some("mailto:x@y.z")),
        AttributeDecision::Keep("mailto:x@y.z".to_string())
    );
    assert_eq!(sanitizer.attribute("a", "href", Some("ftp://x")), AttributeDecision::Drop);
    assert_eq!(
        sanitizer.attribute("p", "title", Some("hi")),
        AttributeDecision::Keep("hi".to_string())
    );
    assert_eq!(sanitizer.attribute("p", "rel", Some("x")), AttributeDecision::Drop);
}

#[test]
fn remove_contents_accepts_a_flag() {
    let config: SanitizerConfig = toml::from_str("remove_contents = true").expect("policy parses");
    let sanitizer = Sanitizer::new(&config).expect("policy compiles");
    assert!(matches!(sanitizer.element("span"), ElementDecision::Remove(r) if !r.keep_contents));
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(toml::from_str::<SanitizerConfig>("elementz = [\"a\"]").is_err());
}

#[test]
fn invalid_protocol_is_reported_with_its_location() {
    let config: SanitizerConfig = toml::from_str(
        r#"
        elements = ["a"]
        [protocols.a]
        href = ["java script"]
        "#,
    )
    .expect("shape is valid");
    let err = Sanitizer::new(&config).err().expect("invalid scheme");
    assert!(matches!(err, ConfigError::InvalidProtocol { ref element, .. } if element == "a"), "got: {err}");
}

#[test]
fn presets_extend_with_overrides() {
    let config = presets::BASIC
        .config()
        .merged(&json!({"elements": ["b"], "allow_comments": true}))
        .expect("merge succeeds");
    assert!(config.allow_comments);
    assert_eq!(config.elements.len(), 1, "sequences are replaced, not unioned");
    assert_eq!(
        config.protocols,
        presets::BASIC.config().protocols,
        "untouched sections survive the merge"
    );
}

#[test]
fn class_lists_and_tag_filter_load_from_toml() {
    let config: SanitizerConfig = toml::from_str(
        r#"
        elements = ["span"]
        escape_tagfilter = false

        [attributes]
        span = ["class"]

        [classes]
        span = ["highlight", "mention"]
        "#,
    )
    .expect("valid config");
    assert!(!config.escape_tagfilter);
    let sanitizer = Sanitizer::new(&config).expect("valid policy");
    assert_eq!(
        sanitizer.attribute("span", "class", Some("mention tracking-pixel")),
        AttributeDecision::Keep("mention".into())
    );
    assert!(!sanitizer.filters_tag("script"));
}
