//! HTML lexing for the streaming rewriter: a resumable tokenizer, the token
//! model it produces, and the small tables and codecs shared with the rewriter.

pub mod elements;
pub mod entities;
pub mod escape;
pub mod token;
pub mod tokenizer;

pub use elements::{is_foreign_root, is_void_element, text_type_after_start_tag};
pub use entities::decode_entities;
pub use escape::{escape_attribute_value, escape_text};
pub use token::{Attribute, AttributeValue, Comment, Doctype, EndTag, StartTag, Text, TextType, Token};
pub use tokenizer::{Step, TEXT_FLUSH_THRESHOLD, Tokenizer, tokenize};
