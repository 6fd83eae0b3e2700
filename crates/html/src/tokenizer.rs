//! Resumable HTML tokenizer.
//!
//! The tokenizer scans a window of decoded input and returns one token per
//! call. It never consumes a partial token: when the window ends inside a
//! construct whose extent is still unknown it answers [`Step::NeedMoreInput`],
//! and the caller retries with a longer window. Feeding the same document in
//! any chunking therefore yields the same token sequence, except that
//! markup-free text is cut once it reaches [`TEXT_FLUSH_THRESHOLD`] bytes so
//! a document without tags does not have to be buffered whole.
//!
//! Invariants:
//! - Every emitted token's `raw` is a prefix of the window it was scanned from;
//!   callers advance by `token.raw().len()`.
//! - Slices are cut only at ASCII structural bytes, so they stay on UTF-8
//!   char boundaries.
//! - Text runs are never split at a `<` that does not start markup.
//!
//! Tag and attribute names end at ASCII whitespace, `/` or `>` as in HTML5, so
//! `<script/xss>` opens a `script` element. Comments close at the first `-->`.
//! Script data escape states (`<!--` inside `<script>`) are not modeled: the
//! first `</script` followed by a delimiter ends the script.

use memchr::{memchr, memmem};

use crate::elements::text_type_after_start_tag;
use crate::token::{Attribute, AttributeValue, Comment, Doctype, EndTag, StartTag, Text, TextType, Token};

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &[u8] = b"-->";
const DOCTYPE_OPEN: &[u8] = b"<!doctype";

/// Pending document text of at least this many bytes is emitted before its
/// end is known.
pub const TEXT_FLUSH_THRESHOLD: usize = 8 * 1024;

#[derive(Debug)]
pub enum Step<'a> {
    Token(Token<'a>),
    NeedMoreInput,
}

#[derive(Debug)]
pub struct Tokenizer {
    text_type: TextType,
    /// Lowercase name of the end tag that leaves the current raw-text run.
    raw_end: String,
    foreign_content: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_html_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_html_whitespace(bytes[i]) {
        i += 1;
    }
    i
}

fn starts_markup(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'!' | b'/' | b'?')
}

fn starts_with_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

fn scan_tag_name(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && !is_html_whitespace(bytes[i]) && bytes[i] != b'/' && bytes[i] != b'>' {
        i += 1;
    }
    i
}

fn incomplete(input: &str, at_eof: bool) -> Step<'_> {
    if at_eof {
        Step::Token(Token::Incomplete(input))
    } else {
        Step::NeedMoreInput
    }
}

fn text(raw: &str, text_type: TextType) -> Step<'_> {
    Step::Token(Token::Text(Text { raw, text_type }))
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            text_type: TextType::Data,
            raw_end: String::new(),
            foreign_content: false,
        }
    }

    pub fn text_type(&self) -> TextType {
        self.text_type
    }

    /// Inside SVG/MathML, raw-text element names parse as ordinary tags.
    pub fn set_foreign_content(&mut self, foreign: bool) {
        self.foreign_content = foreign;
    }

    pub fn foreign_content(&self) -> bool {
        self.foreign_content
    }

    /// Enter `text_type`; for raw-text modes `end_tag` names the element that leaves it.
    pub fn switch_text_type(&mut self, text_type: TextType, end_tag: &str) {
        log::trace!(target: "html.tokenizer", "text type {:?} until </{end_tag}>", text_type);
        self.text_type = text_type;
        self.raw_end.clear();
        self.raw_end.push_str(end_tag);
    }

    /// Scan the next token from `input`. `at_eof` tells whether more input can follow.
    pub fn next_token<'a>(&mut self, input: &'a str, at_eof: bool) -> Step<'a> {
        if input.is_empty() {
            return if at_eof {
                Step::Token(Token::Eof)
            } else {
                Step::NeedMoreInput
            };
        }
        match self.text_type {
            TextType::Data => self.data(input, at_eof),
            TextType::PlainText if at_eof || input.len() >= TEXT_FLUSH_THRESHOLD => text(input, TextType::PlainText),
            TextType::PlainText => Step::NeedMoreInput,
            _ => self.raw_text(input, at_eof),
        }
    }

    fn data<'a>(&mut self, input: &'a str, at_eof: bool) -> Step<'a> {
        let bytes = input.as_bytes();
        if bytes[0] != b'<' {
            return text_run(input, at_eof);
        }
        let Some(&next) = bytes.get(1) else {
            return incomplete(input, at_eof);
        };
        match next {
            b'!' => markup_declaration(input, at_eof),
            b'/' => end_tag(input, at_eof),
            b'?' => bogus_comment(input, 1, at_eof),
            b if b.is_ascii_alphabetic() => self.start_tag(input, at_eof),
            _ => text_run(input, at_eof),
        }
    }

    fn start_tag<'a>(&mut self, input: &'a str, at_eof: bool) -> Step<'a> {
        let bytes = input.as_bytes();
        let name_end = scan_tag_name(bytes, 1);
        let mut attributes = Vec::new();
        let Some((end, self_closing)) = scan_attributes(input, name_end, Some(&mut attributes)) else {
            return incomplete(input, at_eof);
        };
        let name = input[1..name_end].to_ascii_lowercase();
        if !self.foreign_content {
            if let Some(text_type) = text_type_after_start_tag(&name) {
                self.switch_text_type(text_type, &name);
            }
        }
        Step::Token(Token::StartTag(StartTag {
            name,
            attributes,
            self_closing,
            raw: &input[..end],
        }))
    }

    fn raw_text<'a>(&mut self, input: &'a str, at_eof: bool) -> Step<'a> {
        let bytes = input.as_bytes();
        let mut from = 0;
        while let Some(rel) = memchr(b'<', &bytes[from..]) {
            let lt = from + rel;
            match self.closes_raw_text(&bytes[lt..]) {
                Some(true) if lt == 0 => {
                    self.text_type = TextType::Data;
                    return self.data(input, at_eof);
                }
                Some(true) => return text(&input[..lt], self.text_type),
                Some(false) => from = lt + 1,
                None => break,
            }
        }
        if at_eof {
            text(input, self.text_type)
        } else {
            Step::NeedMoreInput
        }
    }

    /// Whether `bytes` starts with the end tag closing the raw-text run;
    /// `None` when the window ends before that can be decided.
    fn closes_raw_text(&self, bytes: &[u8]) -> Option<bool> {
        let name = self.raw_end.as_bytes();
        let needed = name.len() + 3;
        for (k, &b) in bytes.iter().take(needed).enumerate() {
            let ok = match k {
                0 => b == b'<',
                1 => b == b'/',
                k if k - 2 < name.len() => b.eq_ignore_ascii_case(&name[k - 2]),
                _ => is_html_whitespace(b) || b == b'/' || b == b'>',
            };
            if !ok {
                return Some(false);
            }
        }
        if bytes.len() < needed { None } else { Some(true) }
    }
}

/// Text up to the next `<` that starts markup.
fn text_run(input: &str, at_eof: bool) -> Step<'_> {
    let bytes = input.as_bytes();
    let mut from = 0;
    while let Some(rel) = memchr(b'<', &bytes[from..]) {
        let lt = from + rel;
        match bytes.get(lt + 1) {
            Some(&b) if starts_markup(b) && lt > 0 => return text(&input[..lt], TextType::Data),
            Some(_) => from = lt + 1,
            None if at_eof && lt > 0 => return text(&input[..lt], TextType::Data),
            None if at_eof => return incomplete(input, at_eof),
            None if lt >= TEXT_FLUSH_THRESHOLD => return text(&input[..lt], TextType::Data),
            None => return Step::NeedMoreInput,
        }
    }
    if at_eof || input.len() >= TEXT_FLUSH_THRESHOLD {
        text(input, TextType::Data)
    } else {
        Step::NeedMoreInput
    }
}

fn markup_declaration(input: &str, at_eof: bool) -> Step<'_> {
    let bytes = input.as_bytes();
    if input.starts_with(COMMENT_OPEN) {
        return comment(input, at_eof);
    }
    if !at_eof && COMMENT_OPEN.starts_with(input) {
        return Step::NeedMoreInput;
    }
    if starts_with_ignore_ascii_case(bytes, DOCTYPE_OPEN) {
        return doctype(input, at_eof);
    }
    if !at_eof && bytes.len() < DOCTYPE_OPEN.len() && DOCTYPE_OPEN[..bytes.len()].eq_ignore_ascii_case(bytes) {
        return Step::NeedMoreInput;
    }
    bogus_comment(input, 2, at_eof)
}

fn comment(input: &str, at_eof: bool) -> Step<'_> {
    let body = &input[COMMENT_OPEN.len()..];
    // `<!-->` and `<!--->` are complete, empty comments.
    let abrupt = if body.starts_with('>') {
        Some(1)
    } else if body.starts_with("->") {
        Some(2)
    } else {
        None
    };
    if let Some(len) = abrupt {
        return Step::Token(Token::Comment(Comment {
            text: "",
            raw: &input[..COMMENT_OPEN.len() + len],
            terminated: true,
        }));
    }
    match memmem::find(body.as_bytes(), COMMENT_CLOSE) {
        Some(end) => Step::Token(Token::Comment(Comment {
            text: &body[..end],
            raw: &input[..COMMENT_OPEN.len() + end + COMMENT_CLOSE.len()],
            terminated: true,
        })),
        None if at_eof => Step::Token(Token::Comment(Comment {
            text: body,
            raw: input,
            terminated: false,
        })),
        None => Step::NeedMoreInput,
    }
}

/// `<?...>`, `<!...>` and `</3...>` run to the next `>`.
fn bogus_comment(input: &str, text_start: usize, at_eof: bool) -> Step<'_> {
    match memchr(b'>', &input.as_bytes()[text_start..]) {
        Some(rel) => {
            let close = text_start + rel;
            Step::Token(Token::Comment(Comment {
                text: &input[text_start..close],
                raw: &input[..=close],
                terminated: true,
            }))
        }
        None if at_eof => Step::Token(Token::Comment(Comment {
            text: &input[text_start..],
            raw: input,
            terminated: false,
        })),
        None => Step::NeedMoreInput,
    }
}

fn doctype(input: &str, at_eof: bool) -> Step<'_> {
    let Some(close) = memchr(b'>', input.as_bytes()) else {
        return incomplete(input, at_eof);
    };
    let inner = &input[DOCTYPE_OPEN.len()..close];
    let mut rest = inner.trim_start_matches(|c: char| c.is_ascii() && is_html_whitespace(c as u8));
    let name_len = rest
        .bytes()
        .position(is_html_whitespace)
        .unwrap_or(rest.len());
    let name = (name_len > 0).then(|| rest[..name_len].to_ascii_lowercase());
    rest = &rest[name_len..];

    let mut public_id = None;
    let mut system_id = None;
    if let Some(after) = strip_keyword(rest, b"public") {
        rest = after;
        public_id = quoted_identifier(&mut rest);
        system_id = quoted_identifier(&mut rest);
    } else if let Some(after) = strip_keyword(rest, b"system") {
        rest = after;
        system_id = quoted_identifier(&mut rest);
    }

    Step::Token(Token::Doctype(Doctype {
        name,
        public_id,
        system_id,
        raw: &input[..=close],
    }))
}

fn strip_keyword<'a>(s: &'a str, keyword: &[u8]) -> Option<&'a str> {
    let start = skip_whitespace(s.as_bytes(), 0);
    let bytes = &s.as_bytes()[start..];
    starts_with_ignore_ascii_case(bytes, keyword).then(|| &s[start + keyword.len()..])
}

fn quoted_identifier<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let s: &'a str = *rest;
    let start = skip_whitespace(s.as_bytes(), 0);
    let quote = *s.as_bytes().get(start)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let body = &s[start + 1..];
    match memchr(quote, body.as_bytes()) {
        Some(end) => {
            *rest = &body[end + 1..];
            Some(&body[..end])
        }
        None => {
            *rest = "";
            Some(body)
        }
    }
}

fn end_tag(input: &str, at_eof: bool) -> Step<'_> {
    let bytes = input.as_bytes();
    match bytes.get(2) {
        None => return incomplete(input, at_eof),
        // `</>` is dropped by browsers; surface it as an empty bogus comment.
        Some(b'>') => {
            return Step::Token(Token::Comment(Comment {
                text: "",
                raw: &input[..3],
                terminated: true,
            }));
        }
        Some(b) if b.is_ascii_alphabetic() => {}
        Some(_) => return bogus_comment(input, 2, at_eof),
    }
    let name_end = scan_tag_name(bytes, 2);
    let Some((end, _)) = scan_attributes(input, name_end, None) else {
        return incomplete(input, at_eof);
    };
    Step::Token(Token::EndTag(EndTag {
        name: input[2..name_end].to_ascii_lowercase(),
        raw: &input[..end],
    }))
}

/// Scan attributes from `i` up to and including the closing `>`.
///
/// Returns the index past `>` and the self-closing flag, or `None` when the
/// input ends first. Later duplicates of an attribute name are dropped.
fn scan_attributes<'a>(
    input: &'a str,
    mut i: usize,
    mut attributes: Option<&mut Vec<Attribute<'a>>>,
) -> Option<(usize, bool)> {
    let bytes = input.as_bytes();
    loop {
        i = skip_whitespace(bytes, i);
        match *bytes.get(i)? {
            b'>' => return Some((i + 1, false)),
            b'/' => {
                if *bytes.get(i + 1)? == b'>' {
                    return Some((i + 2, true));
                }
                i += 1;
                continue;
            }
            _ => {}
        }

        // A leading `=` is part of the name.
        let name_start = i;
        i += 1;
        while i < bytes.len() && !is_html_whitespace(bytes[i]) && !matches!(bytes[i], b'/' | b'>' | b'=') {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        let name_end = i;

        let mut j = skip_whitespace(bytes, i);
        let value = if *bytes.get(j)? == b'=' {
            j = skip_whitespace(bytes, j + 1);
            match *bytes.get(j)? {
                quote @ (b'"' | b'\'') => {
                    let close = j + 1 + memchr(quote, &bytes[j + 1..])?;
                    i = close + 1;
                    Some(AttributeValue {
                        raw: &input[j + 1..close],
                        quote: Some(quote),
                    })
                }
                b'>' => {
                    i = j;
                    Some(AttributeValue { raw: "", quote: None })
                }
                _ => {
                    let start = j;
                    while j < bytes.len() && !is_html_whitespace(bytes[j]) && bytes[j] != b'>' {
                        j += 1;
                    }
                    if j >= bytes.len() {
                        return None;
                    }
                    i = j;
                    Some(AttributeValue {
                        raw: &input[start..j],
                        quote: None,
                    })
                }
            }
        } else {
            None
        };

        if let Some(attributes) = attributes.as_mut() {
            let name = input[name_start..name_end].to_ascii_lowercase();
            if !attributes.iter().any(|a| a.name == name) {
                attributes.push(Attribute { name, value });
            }
        }
    }
}

/// Tokenize a complete document, applying raw-text switching for HTML elements.
///
/// Foreign content is not tracked; the rewriter drives that itself.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokenizer = Tokenizer::new();
    let mut tokens = Vec::new();
    let mut pos = 0;
    loop {
        match tokenizer.next_token(&input[pos..], true) {
            Step::Token(Token::Eof) => {
                tokens.push(Token::Eof);
                return tokens;
            }
            Step::Token(token) => {
                pos += token.raw().len();
                tokens.push(token);
            }
            // Unreachable with `at_eof`, but never spin.
            Step::NeedMoreInput => return tokens,
        }
    }
}
