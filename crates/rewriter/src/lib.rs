//! Streaming HTML rewriting.
//!
//! A [`Rewriter`] tokenizes input incrementally, keeps only a stack of open
//! elements, and lets a [`sanitizer::Sanitizer`] and any number of
//! [`Handler`]s inspect and mutate elements, text and comments as they
//! stream past. Output is produced in the same pass, inside a memory budget
//! enforced by [`MemoryGovernor`].

mod comment;
mod content;
mod dispatch;
mod element;
pub mod error;
mod handler;
pub mod memory;
pub mod options;
mod rewriter;
mod sanitize;
mod stack;
mod stream;
mod text;

pub use comment::{Comment, CommentTextError};
pub use content::ContentType;
pub use element::{Element, InvalidNameError};
pub use error::{ConfigurationError, HandlerContractError, HandlerError, HandlerResult, MemoryLimitExceeded, RewriteError};
pub use handler::{Capability, ElementHandlerFn, Handler, TextHandlerFn, element_handler, text_handler};
pub use html::TextType;
pub use memory::{LimitedString, MemoryGovernor};
pub use options::{DocumentMode, MemorySettings, ResourceBudget, RewriterOptions};
pub use rewriter::Rewriter;
pub use text::TextChunk;
