//! Token model produced by [`crate::Tokenizer`].
//!
//! Tokens borrow from the tokenizer's input buffer and live only for one
//! dispatch cycle. Every token carries the exact source slice it was scanned
//! from (`raw`), so untouched markup can be re-emitted byte-for-byte.

use std::borrow::Cow;

use crate::entities::decode_entities;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    StartTag(StartTag<'a>),
    EndTag(EndTag<'a>),
    Text(Text<'a>),
    Comment(Comment<'a>),
    Doctype(Doctype<'a>),
    /// Markup cut off by the end of input (`<a href="x`, a lone `<`, `</di`).
    Incomplete(&'a str),
    Eof,
}

impl<'a> Token<'a> {
    /// Source slice the token was scanned from; empty for `Eof`.
    pub fn raw(&self) -> &'a str {
        match self {
            Token::StartTag(tag) => tag.raw,
            Token::EndTag(tag) => tag.raw,
            Token::Text(text) => text.raw,
            Token::Comment(comment) => comment.raw,
            Token::Doctype(doctype) => doctype.raw,
            Token::Incomplete(raw) => raw,
            Token::Eof => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// ASCII-lowercased tag name.
    pub name: String,
    pub attributes: Vec<Attribute<'a>>,
    pub self_closing: bool,
    pub raw: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// ASCII-lowercased attribute name.
    pub name: String,
    pub value: Option<AttributeValue<'a>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeValue<'a> {
    /// Value as written, without the surrounding quotes.
    pub raw: &'a str,
    pub quote: Option<u8>,
}

impl<'a> AttributeValue<'a> {
    /// Value with character references resolved.
    pub fn decoded(&self) -> Cow<'a, str> {
        decode_entities(self.raw)
    }
}

impl<'a> Attribute<'a> {
    /// Decoded value; valueless attributes read as the empty string.
    pub fn decoded_value(&self) -> Cow<'a, str> {
        match &self.value {
            Some(value) => value.decoded(),
            None => Cow::Borrowed(""),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndTag<'a> {
    pub name: String,
    pub raw: &'a str,
}

/// How the text run was tokenized, which decides what markup-like characters mean inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextType {
    Data,
    /// `<title>`, `<textarea>`: character references are live, tags are not.
    RcData,
    /// `<style>`, `<xmp>`, `<iframe>`, `<noembed>`, `<noframes>`, `<noscript>`.
    RawText,
    ScriptData,
    /// Everything after `<plaintext>`.
    PlainText,
}

impl TextType {
    pub fn as_str(self) -> &'static str {
        match self {
            TextType::Data => "data",
            TextType::RcData => "rcdata",
            TextType::RawText => "rawtext",
            TextType::ScriptData => "script",
            TextType::PlainText => "plaintext",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Text<'a> {
    pub raw: &'a str,
    pub text_type: TextType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comment<'a> {
    pub text: &'a str,
    pub raw: &'a str,
    /// False when the input ended before `-->` (or `>` for bogus comments).
    pub terminated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Doctype<'a> {
    pub name: Option<String>,
    pub public_id: Option<&'a str>,
    pub system_id: Option<&'a str>,
    pub raw: &'a str,
}
