#![no_main]

use html::{Step, Token, Tokenizer, tokenize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Tokens cover the input exactly.
    let whole: String = tokenize(input).iter().map(|token| token.raw()).collect();
    assert_eq!(whole, input);

    // Feeding the input in two halves yields the same raw stream.
    let mut split = input.len() / 2;
    while !input.is_char_boundary(split) {
        split -= 1;
    }
    let mut tokenizer = Tokenizer::new();
    let mut pos = 0;
    let mut available = split;
    let mut halves = String::with_capacity(input.len());
    loop {
        match tokenizer.next_token(&input[pos..available], available == input.len()) {
            Step::Token(Token::Eof) => break,
            Step::Token(token) => {
                pos += token.raw().len();
                halves.push_str(token.raw());
            }
            Step::NeedMoreInput => {
                assert!(available < input.len(), "tokenizer stalled at EOF");
                available = input.len();
            }
        }
    }
    assert_eq!(halves, input);
});
