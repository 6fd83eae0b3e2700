//! Allow-list sanitization policy.
//!
//! [`SanitizerConfig`] is the serde-facing description; [`Sanitizer`] is the
//! validated, lookup-optimized form the rewriter consults per element and
//! attribute. Built-in presets live in [`presets`].

pub mod config;
pub mod error;
pub mod policy;
pub mod presets;
pub mod protocol;

pub use config::{RemoveContents, SanitizerConfig, merge};
pub use error::ConfigError;
pub use policy::{AttributeDecision, ElementDecision, Removal, Sanitizer};
pub use presets::{BASIC, DEFAULT, Preset, RELAXED, RESTRICTED};
pub use protocol::{ProtocolRule, UrlKind, classify_url};
