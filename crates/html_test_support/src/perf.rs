//! Generated inputs for scaling and memory tests.

/// A footnote-style fragment that exercises attributes, nesting and text.
pub const FRAGMENT_TEMPLATE: &str = "<p>Paragraph {n} with a footnote reference<sup class=\"footnote-ref\">\
<a href=\"#fn-{n}\" id=\"fnref-{n}\" data-footnote-ref>{n}</a></sup> and <code>code</code>.</p>\n";

pub fn make_fragments(repetitions: usize) -> String {
    let mut html = String::with_capacity(FRAGMENT_TEMPLATE.len() * repetitions + 16);
    for n in 0..repetitions {
        html.push_str(&FRAGMENT_TEMPLATE.replace("{n}", &n.to_string()));
    }
    html
}

/// `<div class=box>` blocks with a span, text and a void element.
pub const BLOCK_TEMPLATE: &str = "<div class=box><span>hello</span><img src=x></div>";

pub fn make_blocks(blocks: usize) -> String {
    BLOCK_TEMPLATE.repeat(blocks)
}

/// A `<script>` body stuffed with near-miss end tags.
pub fn make_rawtext_adversarial(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 32);
    body.push_str("<script>");
    while body.len() < bytes {
        body.push_str("</scri<pt");
    }
    body.push_str("</script>");
    body
}

/// An unterminated comment of roughly `bytes` length.
pub fn make_unterminated_comment(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 8);
    body.push_str("<!--");
    while body.len() < bytes {
        body.push_str("- -> <!-- ");
    }
    body
}
