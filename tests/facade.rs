use serde_json::json;
use sieve::{BASIC, ContentType, Rewriter, RewriterOptions, Sanitizer, SanitizerConfig, element_handler, sanitize};

#[test]
fn sanitize_with_a_preset() {
    let out = sanitize("<p onclick=\"x()\">hi<script>x</script></p>", &BASIC.config()).expect("sanitizes");
    assert_eq!(out, "<p>hi</p>");
}

#[test]
fn invalid_policy_surfaces_as_configuration_error() {
    let config = SanitizerConfig::from_value(json!({"protocols": {"a": {"href": [":all"]}}})).expect("shape");
    let err = sanitize("x", &config).unwrap_err();
    assert!(matches!(err, sieve::RewriteError::Configuration(_)), "got: {err}");
}

#[test]
fn sanitize_then_rewrite() {
    let sanitizer = Sanitizer::new(&BASIC.config()).expect("preset");
    let handler = element_handler("a[href^=\"https:\"]", |el| {
        el.set_attribute("rel", "noopener")?;
        el.after(" ↗", ContentType::Text);
        Ok(())
    })
    .expect("valid selector");
    let mut rewriter = Rewriter::new(Some(sanitizer), vec![handler], RewriterOptions::default()).expect("valid");
    let out = rewriter
        .rewrite_str(r#"<a href="https://x" target="_blank">x</a> <a href="/y">y</a>"#)
        .expect("rewrites");
    assert_eq!(out, r#"<a href="https://x" rel="noopener">x</a> ↗ <a href="/y">y</a>"#);
}
