use html_test_support::{chunk_plans, perf::make_fragments};
use rewriter::{ContentType, Handler, Rewriter, RewriterOptions, element_handler, text_handler};
use sanitizer::{BASIC, RELAXED, Sanitizer};

const SEED: u64 = 0x5eed_c0de;

const INPUTS: &[&str] = &[
    "<p class=\"x\">Hello, <b>wörld</b> 😀</p>",
    "<div><script>if (a < b) { x(\"</scr\" + \"ipt>\") }</script><p>after</p></div>",
    "<a href=\"java&#x09;script:alert(1)\" title='q &amp; a'>link</a>",
    "<!-- c --><svg><style><b>x</b></style></svg><textarea></b></textarea>",
    "<<foo>script>alert(1)<</foo>/script>",
    "<p>unterminated <a href=\"x",
    "<!DOCTYPE html><title>a &lt; b</title><pre>\n<code>x</code></pre>",
];

fn handlers() -> Vec<Box<dyn Handler + Send>> {
    vec![
        element_handler("a", |el| {
            el.set_attribute("rel", "nofollow")?;
            Ok(())
        })
        .expect("valid selector"),
        text_handler("p", |text| {
            if text.as_str().contains("after") {
                text.after("!", ContentType::Text);
            }
            Ok(())
        })
        .expect("valid selector"),
    ]
}

fn rewriters() -> Vec<(&'static str, Rewriter)> {
    let relaxed = Sanitizer::new(&RELAXED.config()).expect("preset");
    let basic = Sanitizer::new(&BASIC.config()).expect("preset");
    vec![
        (
            "handlers",
            Rewriter::new(None, handlers(), RewriterOptions::default()).expect("valid rewriter"),
        ),
        ("basic", Rewriter::sanitize_only(basic)),
        (
            "relaxed+handlers",
            Rewriter::new(Some(relaxed), handlers(), RewriterOptions::default()).expect("valid rewriter"),
        ),
    ]
}

#[test]
fn output_does_not_depend_on_chunk_boundaries() {
    let _ = env_logger::builder().is_test(true).try_init();
    for (label, mut rewriter) in rewriters() {
        for input in INPUTS {
            let expected = rewriter.rewrite(input.as_bytes()).expect("whole input");
            for plan in chunk_plans(input.as_bytes(), 8, SEED) {
                let chunks = plan.split(input.as_bytes());
                let actual = rewriter
                    .rewrite_chunks(chunks.iter().copied())
                    .expect("chunked input");
                assert_eq!(
                    actual.as_bytes(),
                    expected.as_slice(),
                    "{label}: plan `{}` diverged on {input:?}",
                    plan.label
                );
            }
        }
    }
}

#[test]
fn large_documents_split_at_arbitrary_offsets() {
    let input = make_fragments(200);
    let sanitizer = Sanitizer::new(&RELAXED.config()).expect("preset");
    let mut rewriter = Rewriter::new(Some(sanitizer), handlers(), RewriterOptions::default()).expect("valid");
    let expected = rewriter.rewrite_str(&input).expect("whole input");
    for size in [1usize, 13, 4096] {
        let actual = rewriter
            .rewrite_chunks(input.as_bytes().chunks(size))
            .expect("chunked input");
        assert!(actual == expected, "chunk size {size} diverged");
    }
}

#[test]
fn invalid_utf8_is_replaced_consistently() {
    let input: &[u8] = b"<p>a\xffb\xe2\x82</p>";
    let noop = element_handler("p", |_| Ok(())).expect("valid selector");
    let mut rewriter = Rewriter::new(None, vec![noop], RewriterOptions::default()).expect("valid");
    let whole = rewriter.rewrite(input).expect("whole input");
    assert_eq!(String::from_utf8(whole.clone()).expect("utf-8 output"), "<p>a\u{FFFD}b\u{FFFD}</p>");
    let bytewise = rewriter
        .rewrite_chunks(input.chunks(1))
        .expect("chunked input");
    assert_eq!(bytewise.into_bytes(), whole);
}
