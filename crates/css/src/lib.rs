//! CSS selectors evaluated against a stack of open elements.
//!
//! There is no tree to walk: an element is matched once, when it opens, using
//! its own tag and attributes plus the ancestors still on the stack.
//! Supported: `*`, type, `#id`, `.class`, attribute selectors with
//! `= ~= |= ^= $= *=` and the `i` flag, `:not(...)` over compound selectors,
//! descendant and child combinators, and comma-separated lists.

pub mod error;
pub mod matching;
pub mod selector;
pub mod syntax;

pub use error::{SelectorError, SyntaxReason};
pub use matching::MatchElement;
pub use selector::{Selector, SelectorBuilder, SelectorSpec};
pub use syntax::{
    AttributeOperator, AttributeSelector, Combinator, ComplexSelector, Compound, SelectorList, SimpleSelector,
};
