use html_test_support::perf::{make_fragments, make_unterminated_comment};
use rewriter::{ContentType, Handler, RewriteError, Rewriter, RewriterOptions, element_handler, text_handler};
use sanitizer::{RELAXED, Sanitizer};

fn chained_handlers() -> Vec<Box<dyn Handler + Send>> {
    vec![
        element_handler("a", |el| {
            el.set_attribute("rel", "nofollow")?;
            Ok(())
        })
        .expect("valid selector"),
        element_handler("sup", |el| {
            el.remove_attribute("class");
            Ok(())
        })
        .expect("valid selector"),
        text_handler("p", |text| {
            if text.as_str().starts_with("Paragraph") {
                let shorter = text.as_str().replacen("Paragraph", "Para", 1);
                text.replace(&shorter, ContentType::Text);
            }
            Ok(())
        })
        .expect("valid selector"),
    ]
}

fn relaxed_rewriter(options: RewriterOptions) -> Result<Rewriter, RewriteError> {
    let sanitizer = Sanitizer::new(&RELAXED.config()).expect("preset");
    Rewriter::new(Some(sanitizer), chained_handlers(), options)
}

#[test]
fn large_document_with_chained_handlers() {
    let _ = env_logger::builder().is_test(true).try_init();
    let input = make_fragments(100_000);
    let mut rewriter = relaxed_rewriter(RewriterOptions::default()).expect("valid rewriter");
    let output = rewriter.rewrite_str(&input).expect("unbounded rewrite succeeds");

    assert!(output.starts_with("<p>Para 0 with"), "got: {}", &output[..80]);
    assert!(output.contains(r##"<a href="#fn-99999" id="fnref-99999" rel="nofollow">99999</a>"##));
    assert!(!output.contains("data-footnote-ref"));
    assert!(!output.contains("footnote-ref\""));

    // Only the parse buffer and at most two output buffers are live at once.
    let peak = rewriter.peak_memory();
    assert!(peak > 0);
    assert!(peak < 6 * input.len(), "peak {peak} for {} input bytes", input.len());
}

#[test]
fn tight_budget_is_exhausted() {
    let input = make_fragments(20_000);
    let options = RewriterOptions::default().with_memory(1024 * 1024, 64 * 1024);
    let mut rewriter = relaxed_rewriter(options).expect("valid rewriter");
    let err = rewriter.rewrite_str(&input).unwrap_err();
    assert!(matches!(err, RewriteError::ResourceExhausted(_)), "got: {err}");
    assert!(rewriter.peak_memory() <= 1024 * 1024);
}

#[test]
fn budget_large_enough_succeeds() {
    let input = make_fragments(1_000);
    let options = RewriterOptions::default().with_memory(4 * 1024 * 1024, 16 * 1024);
    let mut rewriter = relaxed_rewriter(options).expect("valid rewriter");
    rewriter.rewrite_str(&input).expect("fits the budget");
    assert!(rewriter.peak_memory() <= 4 * 1024 * 1024);
}

#[test]
fn unterminated_comment_cannot_grow_past_the_budget() {
    let input = make_unterminated_comment(2 * 1024 * 1024);
    let options = RewriterOptions::default().with_memory(512 * 1024, 16 * 1024);
    let mut rewriter = relaxed_rewriter(options).expect("valid rewriter");
    let err = rewriter.rewrite_str(&input).unwrap_err();
    assert!(matches!(err, RewriteError::ResourceExhausted(_)), "got: {err}");
}

#[test]
fn markup_free_document_is_not_buffered_whole() {
    let input = "plain words and nothing else ".repeat(100_000);
    let noop = element_handler("p", |_| Ok(())).expect("valid selector");
    let mut rewriter = Rewriter::new(None, vec![noop], RewriterOptions::default()).expect("valid rewriter");
    let output = rewriter.rewrite_str(&input).expect("rewrite succeeds");
    assert_eq!(output.len(), input.len());
    // The output buffer alone may reach twice the input; the parse buffer stays small.
    let peak = rewriter.peak_memory();
    assert!(peak < 2 * input.len(), "peak {peak} for {} input bytes", input.len());
}

#[test]
fn preallocation_larger_than_limit_is_rejected() {
    let options = RewriterOptions::default().with_memory(1024, 4096);
    assert!(matches!(
        relaxed_rewriter(options),
        Err(RewriteError::Configuration(_))
    ));
}

#[cfg(feature = "perf-tests")]
mod scaling {
    use std::time::{Duration, Instant};

    use super::*;

    fn time_rewrite(fragments: usize) -> Duration {
        let input = make_fragments(fragments);
        let mut rewriter = relaxed_rewriter(RewriterOptions::default()).expect("valid rewriter");
        let start = Instant::now();
        rewriter.rewrite_str(&input).expect("rewrite succeeds");
        start.elapsed()
    }

    fn time(rewriter: &mut Rewriter, input: &str) -> Duration {
        let start = Instant::now();
        rewriter.rewrite_str(input).expect("rewrite succeeds");
        start.elapsed()
    }

    #[test]
    fn stray_end_tags_under_deep_nesting_scale_linearly() {
        let nested = |n: usize| format!("{}{}", "<i>".repeat(n), "</b>".repeat(n));
        let mut rewriter = Rewriter::sanitize_only(Sanitizer::new(&RELAXED.config()).expect("preset"));
        time(&mut rewriter, &nested(1_000));
        let small = time(&mut rewriter, &nested(10_000));
        let large = time(&mut rewriter, &nested(40_000));
        let ratio = large.as_secs_f64() / small.as_secs_f64().max(1e-6);
        assert!(ratio < 8.0, "4x input took {ratio:.1}x as long ({small:?} vs {large:?})");
    }

    #[test]
    fn failing_descendant_selector_does_not_backtrack() {
        let handler = element_handler("p div div", |el| {
            el.set_attribute("data-hit", "1")?;
            Ok(())
        })
        .expect("valid selector");
        let mut rewriter = Rewriter::new(None, vec![handler], RewriterOptions::default()).expect("valid rewriter");
        let nested = |n: usize| "<div>".repeat(n);
        time(&mut rewriter, &nested(500));
        let small = time(&mut rewriter, &nested(2_000));
        let large = time(&mut rewriter, &nested(4_000));
        // Each element scans its ancestors once, so doubling depth costs about 4x.
        let ratio = large.as_secs_f64() / small.as_secs_f64().max(1e-6);
        assert!(ratio < 6.0, "2x depth took {ratio:.1}x as long ({small:?} vs {large:?})");
    }

    #[test]
    fn rewrite_time_scales_linearly() {
        time_rewrite(1_000);
        let small = time_rewrite(10_000);
        let large = time_rewrite(40_000);
        let ratio = large.as_secs_f64() / small.as_secs_f64().max(1e-6);
        assert!(ratio < 8.0, "4x input took {ratio:.1}x as long ({small:?} vs {large:?})");
    }
}
