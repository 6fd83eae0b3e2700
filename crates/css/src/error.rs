use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,
    #[error("invalid selector `{input}` at byte {position}: {reason}")]
    Syntax {
        input: String,
        position: usize,
        reason: SyntaxReason,
    },
    #[error("unsupported pseudo-class `:{0}`")]
    UnsupportedPseudoClass(String),
    #[error("selector must specify `match_element` or `match_text_within`")]
    MissingTarget,
    #[error("`ignore_text_within` entry `{0}` is not a tag name")]
    InvalidIgnoreTag(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SyntaxReason {
    #[error("expected a selector")]
    ExpectedSelector,
    #[error("expected an identifier")]
    ExpectedIdentifier,
    #[error("expected an attribute value")]
    ExpectedAttributeValue,
    #[error("expected `]`")]
    UnclosedAttribute,
    #[error("expected `)`")]
    UnclosedParenthesis,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("dangling combinator")]
    DanglingCombinator,
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("combinators are not allowed inside `:not()`")]
    CombinatorInNegation,
}
