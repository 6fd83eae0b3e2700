//! Selector-list parsing.
//!
//! Input: `"div > p.note, a[href^='https:' i]:not(.skip)"`
//! Output: a [`SelectorList`] of complex selectors, each a left-to-right run
//! of compounds joined by combinators.

use std::fmt;

use crate::error::{SelectorError, SyntaxReason};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    pub(crate) selectors: Vec<ComplexSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    /// Compounds in source order; each carries the combinator linking it to
    /// the compound before it (ignored for the first).
    pub(crate) parts: Vec<(Combinator, Compound)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound {
    pub(crate) simple: Vec<SimpleSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    /// Matches when none of the compounds match.
    Not(Vec<Compound>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: Option<(AttributeOperator, String)>,
    pub case_insensitive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        if input.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = Parser { input, pos: 0 };
        let list = parser.selector_list(false)?;
        parser.skip_whitespace();
        if parser.pos < input.len() {
            return Err(parser.error(SyntaxReason::UnexpectedCharacter));
        }
        log::trace!(target: "css.selector", "compiled `{input}` into {} selector(s)", list.len());
        Ok(SelectorList { selectors: list })
    }

    pub fn selectors(&self) -> &[ComplexSelector] {
        &self.selectors
    }
}

impl ComplexSelector {
    pub fn parts(&self) -> &[(Combinator, Compound)] {
        &self.parts
    }
}

impl Compound {
    pub fn simple_selectors(&self) -> &[SimpleSelector] {
        &self.simple
    }
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SelectorList::parse(s)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

impl<'a> Parser<'a> {
    fn error(&self, reason: SyntaxReason) -> SelectorError {
        SelectorError::Syntax {
            input: self.input.to_string(),
            position: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// Comma-separated complex selectors. Inside `:not()` only compounds are allowed.
    fn selector_list(&mut self, in_negation: bool) -> Result<Vec<ComplexSelector>, SelectorError> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            list.push(self.complex(in_negation)?);
            self.skip_whitespace();
            if !self.eat(b',') {
                return Ok(list);
            }
        }
    }

    fn complex(&mut self, in_negation: bool) -> Result<ComplexSelector, SelectorError> {
        let mut parts = vec![(Combinator::Descendant, self.compound()?)];
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(b',' | b')') | None => return Ok(ComplexSelector { parts }),
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.error(SyntaxReason::UnexpectedCharacter)),
            };
            if in_negation {
                return Err(self.error(SyntaxReason::CombinatorInNegation));
            }
            if matches!(self.peek(), Some(b',' | b')') | None) {
                return Err(self.error(SyntaxReason::DanglingCombinator));
            }
            parts.push((combinator, self.compound()?));
        }
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut simple = Vec::new();
        if self.eat(b'*') {
            simple.push(SimpleSelector::Universal);
        } else if self.peek().is_some_and(is_name_byte) {
            simple.push(SimpleSelector::Type(self.identifier()?.to_ascii_lowercase()));
        }
        loop {
            match self.peek() {
                Some(b'#') => {
                    self.pos += 1;
                    simple.push(SimpleSelector::Id(self.identifier()?.to_string()));
                }
                Some(b'.') => {
                    self.pos += 1;
                    simple.push(SimpleSelector::Class(self.identifier()?.to_string()));
                }
                Some(b'[') => {
                    self.pos += 1;
                    simple.push(SimpleSelector::Attribute(self.attribute()?));
                }
                Some(b':') => {
                    self.pos += 1;
                    simple.push(self.pseudo_class()?);
                }
                _ => break,
            }
        }
        if simple.is_empty() {
            return Err(self.error(SyntaxReason::ExpectedSelector));
        }
        Ok(Compound { simple })
    }

    fn identifier(&mut self) -> Result<&'a str, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error(SyntaxReason::ExpectedIdentifier));
        }
        Ok(&self.input[start..self.pos])
    }

    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.identifier()?.to_ascii_lowercase();
        self.skip_whitespace();
        let operator = match self.peek() {
            Some(b']') => None,
            Some(b'=') => Some(AttributeOperator::Equals),
            Some(b'~') => Some(AttributeOperator::Includes),
            Some(b'|') => Some(AttributeOperator::DashMatch),
            Some(b'^') => Some(AttributeOperator::Prefix),
            Some(b'$') => Some(AttributeOperator::Suffix),
            Some(b'*') => Some(AttributeOperator::Substring),
            Some(_) => return Err(self.error(SyntaxReason::UnexpectedCharacter)),
            None => return Err(self.error(SyntaxReason::UnclosedAttribute)),
        };
        let Some(operator) = operator else {
            self.pos += 1;
            return Ok(AttributeSelector {
                name,
                operator: None,
                case_insensitive: false,
            });
        };
        if operator != AttributeOperator::Equals {
            self.pos += 1;
        }
        if !self.eat(b'=') {
            return Err(self.error(SyntaxReason::UnexpectedCharacter));
        }
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                self.string(quote)?
            }
            Some(b) if is_name_byte(b) => self.identifier()?.to_string(),
            _ => return Err(self.error(SyntaxReason::ExpectedAttributeValue)),
        };
        self.skip_whitespace();
        let mut case_insensitive = false;
        match self.peek() {
            Some(b'i' | b'I') => {
                self.pos += 1;
                case_insensitive = true;
            }
            Some(b's' | b'S') => self.pos += 1,
            _ => {}
        }
        self.skip_whitespace();
        if !self.eat(b']') {
            return Err(self.error(SyntaxReason::UnclosedAttribute));
        }
        Ok(AttributeSelector {
            name,
            operator: Some((operator, value)),
            case_insensitive,
        })
    }

    /// Quoted string body after the opening quote; `\` escapes the next character.
    fn string(&mut self, quote: u8) -> Result<String, SelectorError> {
        let mut out = String::new();
        let mut chars = self.input[self.pos..].char_indices();
        while let Some((offset, ch)) = chars.next() {
            match ch {
                '\\' => match chars.next() {
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                c if c as u32 == quote as u32 => {
                    self.pos += offset + 1;
                    return Ok(out);
                }
                c => out.push(c),
            }
        }
        self.pos = self.input.len();
        Err(self.error(SyntaxReason::UnterminatedString))
    }

    fn pseudo_class(&mut self) -> Result<SimpleSelector, SelectorError> {
        let name = self.identifier()?.to_ascii_lowercase();
        if name != "not" {
            return Err(SelectorError::UnsupportedPseudoClass(name));
        }
        if !self.eat(b'(') {
            return Err(self.error(SyntaxReason::UnexpectedCharacter));
        }
        let inner = self.selector_list(true)?;
        self.skip_whitespace();
        if !self.eat(b')') {
            return Err(self.error(SyntaxReason::UnclosedParenthesis));
        }
        let compounds = inner
            .into_iter()
            .filter_map(|complex| complex.parts.into_iter().next().map(|(_, compound)| compound))
            .collect();
        Ok(SimpleSelector::Not(compounds))
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{complex}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (combinator, compound)) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(match combinator {
                    Combinator::Descendant => " ",
                    Combinator::Child => " > ",
                })?;
            }
            write!(f, "{compound}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for simple in &self.simple {
            match simple {
                SimpleSelector::Universal => f.write_str("*")?,
                SimpleSelector::Type(name) => f.write_str(name)?,
                SimpleSelector::Id(id) => write!(f, "#{id}")?,
                SimpleSelector::Class(class) => write!(f, ".{class}")?,
                SimpleSelector::Attribute(attr) => {
                    write!(f, "[{}", attr.name)?;
                    if let Some((op, value)) = &attr.operator {
                        let op = match op {
                            AttributeOperator::Equals => "=",
                            AttributeOperator::Includes => "~=",
                            AttributeOperator::DashMatch => "|=",
                            AttributeOperator::Prefix => "^=",
                            AttributeOperator::Suffix => "$=",
                            AttributeOperator::Substring => "*=",
                        };
                        write!(f, "{op}{value:?}")?;
                        if attr.case_insensitive {
                            f.write_str(" i")?;
                        }
                    }
                    f.write_str("]")?;
                }
                SimpleSelector::Not(compounds) => {
                    f.write_str(":not(")?;
                    for (i, compound) in compounds.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{compound}")?;
                    }
                    f.write_str(")")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> SelectorList {
        SelectorList::parse(s).unwrap_or_else(|err| panic!("`{s}` should parse: {err}"))
    }

    #[test]
    fn parses_type_id_class_and_universal() {
        assert_eq!(parse("*").to_string(), "*");
        assert_eq!(parse("DIV").to_string(), "div");
        assert_eq!(parse("p#intro.note.wide").to_string(), "p#intro.note.wide");
    }

    #[test]
    fn parses_lists_and_combinators() {
        let list = parse("div, p > a  span");
        assert_eq!(list.selectors().len(), 2);
        assert_eq!(list.to_string(), "div, p > a span");
        let parts = list.selectors()[1].parts();
        assert_eq!(parts[1].0, Combinator::Child);
        assert_eq!(parts[2].0, Combinator::Descendant);
    }

    #[test]
    fn parses_attribute_operators() {
        assert_eq!(
            parse("a[href][rel~=nofollow][lang|=en][href^='https:' i][src$=\".png\"][title*=x]").to_string(),
            "a[href][rel~=\"nofollow\"][lang|=\"en\"][href^=\"https:\" i][src$=\".png\"][title*=\"x\"]"
        );
    }

    #[test]
    fn parses_negation() {
        assert_eq!(parse("a:not([class=\"anchor\"])").to_string(), "a:not([class=\"anchor\"])");
        assert_eq!(parse(":not(.a, b)").to_string(), ":not(.a, b)");
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!(SelectorList::parse(""), Err(SelectorError::Empty));
        assert_eq!(SelectorList::parse("   "), Err(SelectorError::Empty));
    }

    #[test]
    fn rejects_invalid_syntax() {
        for bad in ["a[href=]", "a[", "div >", "div,", ", div", "a..b", "a[href='x]", "a:not(b c)", "a:not(b", "p!"] {
            let err = SelectorList::parse(bad).expect_err(bad);
            assert!(matches!(err, SelectorError::Syntax { .. }), "`{bad}` gave {err:?}");
        }
    }

    #[test]
    fn rejects_unsupported_pseudo_classes() {
        assert_eq!(
            SelectorList::parse("li:nth-child"),
            Err(SelectorError::UnsupportedPseudoClass("nth-child".to_string()))
        );
    }
}
