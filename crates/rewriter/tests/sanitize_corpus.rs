use std::path::PathBuf;

use html_test_support::{CaseStatus, diff_lines, load_corpus, markup_lines};
use rewriter::Rewriter;
use sanitizer::{Preset, Sanitizer, presets};

fn fixture(preset: &Preset) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(format!("{}.toml", preset.name))
}

fn run_corpus(preset: &Preset) {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = fixture(preset);
    let corpus = load_corpus(&path).unwrap_or_else(|err| panic!("{}: {err}", path.display()));
    assert!(!corpus.cases.is_empty(), "{} has no cases", path.display());

    let sanitizer = Sanitizer::new(&preset.config()).expect("preset compiles");
    let mut rewriter = Rewriter::sanitize_only(sanitizer);
    let mut failures = Vec::new();
    for case in &corpus.cases {
        if case.status == CaseStatus::Skip {
            continue;
        }
        let actual = rewriter.rewrite_str(&case.input).expect("sanitizing never fails");
        let passed = actual == case.expected;
        match (case.status, passed) {
            (CaseStatus::Active, false) => failures.push(format!(
                "[{}] {}\n{}",
                preset.name,
                case.name,
                diff_lines(&markup_lines(&case.expected), &markup_lines(&actual))
            )),
            (CaseStatus::Xfail, true) => failures.push(format!(
                "[{}] {} passes but is marked xfail: {}",
                preset.name,
                case.name,
                case.reason.as_deref().unwrap_or_default()
            )),
            _ => {}
        }

        if case.status == CaseStatus::Active {
            let again = rewriter.rewrite_str(&actual).expect("sanitizing never fails");
            if again != actual {
                failures.push(format!("[{}] {} is not idempotent: {again:?}", preset.name, case.name));
            }
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn default_corpus() {
    run_corpus(&presets::DEFAULT);
}

#[test]
fn restricted_corpus() {
    run_corpus(&presets::RESTRICTED);
}

#[test]
fn basic_corpus() {
    run_corpus(&presets::BASIC);
}

#[test]
fn relaxed_corpus() {
    run_corpus(&presets::RELAXED);
}

/// Inputs where removing each inner tag would expose the next layer of markup.
fn nested_splices(depth: usize) -> Vec<String> {
    vec![
        format!("{}{}script>alert(1)", "<".repeat(depth + 1), "i>".repeat(depth + 1)),
        format!("<scr{}ipt>alert(1)</scr{}ipt>", "<i>".repeat(depth), "</i>".repeat(depth)),
        format!("{}script>x", "<<b>".repeat(depth)),
        format!("{}script>x{}", "<<!-- -->".repeat(depth), "-->".repeat(depth)),
    ]
}

#[test]
fn nested_splices_are_stable_after_one_pass() {
    for preset in &presets::ALL {
        let sanitizer = Sanitizer::new(&preset.config()).expect("preset compiles");
        let mut rewriter = Rewriter::sanitize_only(sanitizer);
        for depth in 1..=12 {
            for input in nested_splices(depth) {
                let once = rewriter.rewrite_str(&input).expect("sanitizing never fails");
                let twice = rewriter.rewrite_str(&once).expect("sanitizing never fails");
                assert_eq!(once, twice, "[{}] depth {depth} of {input:?}", preset.name);
                assert!(!once.contains("<script"), "[{}] {input:?} gave {once:?}", preset.name);
            }
        }
    }
}

#[test]
fn every_preset_has_a_corpus() {
    for preset in &presets::ALL {
        assert!(fixture(preset).exists(), "missing corpus for {}", preset.name);
    }
}
