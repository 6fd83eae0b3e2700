use html::{Step, Token, Tokenizer, tokenize};
use html_test_support::perf::{make_blocks, make_rawtext_adversarial, make_unterminated_comment};
use html_test_support::{chunk_plans, diff_lines};

const INPUTS: &[&str] = &[
    "<!DOCTYPE html><html><head><title>A &amp; B</title></head><body>",
    "<p class=\"x\" data-a='1' hidden>Hello <b>world</b></p>",
    "foo <!-- <!-- <!-- --> --> -->bar",
    "<script>if (a < b && c > d) { document.write('</p>') }</script>tail",
    "<textarea><b>not bold</b></textarea><style>p > a { }</style>",
    "<<script>alert(\"XSS\");//<</script>",
    "<img src=\"javascript:alert('XSS')\"",
    "naïve café <a href=\"/ü\">ünïcode</a> 😀",
    "<div <!-- comment -->>bar</div></>",
];

/// Drive the tokenizer over `chunks`, growing the window only when asked.
fn tokenize_in_chunks(input: &str, boundaries: &[usize]) -> Vec<String> {
    let mut ends: Vec<usize> = boundaries
        .iter()
        .map(|&b| {
            let mut b = b;
            while !input.is_char_boundary(b) {
                b += 1;
            }
            b
        })
        .collect();
    ends.push(input.len());
    ends.dedup();

    let mut tokenizer = Tokenizer::new();
    let mut next_end = ends.into_iter();
    let mut available = next_end.next().unwrap_or(0);
    let mut pos = 0;
    let mut out = Vec::new();
    loop {
        let at_eof = available == input.len();
        match tokenizer.next_token(&input[pos..available], at_eof) {
            Step::Token(Token::Eof) => return out,
            Step::Token(token) => {
                pos += token.raw().len();
                out.push(token.raw().to_string());
            }
            Step::NeedMoreInput => {
                available = next_end.next().expect("tokenizer asked for input past EOF");
            }
        }
    }
}

fn whole(input: &str) -> Vec<String> {
    tokenize(input)
        .iter()
        .filter(|t| !matches!(t, Token::Eof))
        .map(|t| t.raw().to_string())
        .collect()
}

#[test]
fn chunk_plans_produce_identical_token_boundaries() {
    for input in INPUTS {
        let expected = whole(input);
        for plan in chunk_plans(input.as_bytes(), 4, 0xC0FFEE) {
            let actual = tokenize_in_chunks(input, &plan.boundaries);
            assert!(
                actual == expected,
                "chunked mismatch for {input:?} [{}]\n{}",
                plan.label,
                diff_lines(&expected, &actual)
            );
        }
    }
}

#[test]
fn repeated_blocks_tokenize_to_expected_counts() {
    // StartTag(div), StartTag(span), Text, EndTag(span), StartTag(img), EndTag(div).
    const TOKENS_PER_BLOCK: usize = 6;
    let blocks = 2_000;
    let input = make_blocks(blocks);
    let tokens = tokenize(&input);
    assert_eq!(tokens.len(), blocks * TOKENS_PER_BLOCK + 1);
}

#[test]
fn rawtext_near_misses_stay_one_text_run() {
    let input = make_rawtext_adversarial(256 * 1024);
    let tokens = tokenize(&input);
    assert_eq!(tokens.len(), 4, "expected start, text, end, eof");
    assert!(matches!(tokens[1], Token::Text(_)), "got: {:?}", tokens[1]);
}

#[test]
fn unterminated_comment_is_a_single_token() {
    let input = make_unterminated_comment(256 * 1024);
    let tokens = tokenize(&input);
    assert_eq!(tokens.len(), 2);
    assert!(
        matches!(tokens[0], Token::Comment(c) if !c.terminated),
        "got: {:?}",
        tokens[0]
    );
}
