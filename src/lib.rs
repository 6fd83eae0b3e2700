//! Streaming HTML rewriting and allow-list sanitization.
//!
//! The engine lives in the workspace crates; this crate gathers their public
//! surface under one name:
//!
//! - [`html`]: resumable tokenizer, entity decoding and escaping.
//! - [`css`]: the selector subset handlers are bound with.
//! - [`sanitizer`]: policies, presets and configuration merging.
//! - [`rewriter`]: the streaming rewriter, handler surfaces and memory budget.

pub use css;
pub use html;
pub use rewriter;
pub use sanitizer;

pub use css::{Selector, SelectorError, SelectorSpec};
pub use rewriter::{
    Comment, ConfigurationError, ContentType, DocumentMode, Element, Handler, HandlerError, HandlerResult,
    RewriteError, Rewriter, RewriterOptions, TextChunk, element_handler, text_handler,
};
pub use sanitizer::{BASIC, DEFAULT, RELAXED, RESTRICTED, Sanitizer, SanitizerConfig};

/// Sanitize `input` under `config` with default rewriter options.
pub fn sanitize(input: &str, config: &SanitizerConfig) -> Result<String, RewriteError> {
    let sanitizer = Sanitizer::new(config).map_err(ConfigurationError::from)?;
    Rewriter::sanitize_only(sanitizer).rewrite_str(input)
}
