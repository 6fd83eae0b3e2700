//! Per-rewriter settings.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigurationError;

/// Whether input is a full document or a fragment of one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentMode {
    #[default]
    Document,
    /// Doctypes are dropped regardless of the sanitizer's `allow_doctype`.
    Fragment,
}

/// Memory settings as they appear in configuration. Either both or neither
/// must be given; [`ResourceBudget::from_settings`] enforces that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemorySettings {
    pub max_allowed_memory_usage: Option<usize>,
    pub preallocated_parsing_buffer_size: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RewriterOptions {
    pub memory: Option<MemorySettings>,
    pub document_mode: DocumentMode,
}

impl RewriterOptions {
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_memory(mut self, max_allowed_memory_usage: usize, preallocated_parsing_buffer_size: usize) -> Self {
        self.memory = Some(MemorySettings {
            max_allowed_memory_usage: Some(max_allowed_memory_usage),
            preallocated_parsing_buffer_size: Some(preallocated_parsing_buffer_size),
        });
        self
    }

    pub fn fragment(mut self) -> Self {
        self.document_mode = DocumentMode::Fragment;
        self
    }
}

/// Validated memory bounds for one rewrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceBudget {
    /// Hard ceiling on buffered bytes (parse buffer plus output).
    pub max_allowed_memory_usage: usize,
    /// Initial capacity of the parse buffer.
    pub preallocated_parsing_buffer_size: usize,
}

impl ResourceBudget {
    pub fn new(max_allowed_memory_usage: usize, preallocated_parsing_buffer_size: usize) -> Result<Self, ConfigurationError> {
        if preallocated_parsing_buffer_size > max_allowed_memory_usage {
            return Err(ConfigurationError::PreallocationExceedsLimit {
                preallocated: preallocated_parsing_buffer_size,
                max: max_allowed_memory_usage,
            });
        }
        Ok(Self {
            max_allowed_memory_usage,
            preallocated_parsing_buffer_size,
        })
    }

    /// `Ok(None)` means unbounded.
    pub fn from_settings(settings: Option<&MemorySettings>) -> Result<Option<Self>, ConfigurationError> {
        let Some(settings) = settings else {
            return Ok(None);
        };
        match (settings.max_allowed_memory_usage, settings.preallocated_parsing_buffer_size) {
            (None, None) => Ok(None),
            (Some(max), Some(preallocated)) => Self::new(max, preallocated).map(Some),
            (Some(_), None) => Err(ConfigurationError::IncompleteMemorySettings(
                "max_allowed_memory_usage",
                "preallocated_parsing_buffer_size",
            )),
            (None, Some(_)) => Err(ConfigurationError::IncompleteMemorySettings(
                "preallocated_parsing_buffer_size",
                "max_allowed_memory_usage",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn memory_settings_must_come_in_pairs() {
        let only_max = MemorySettings {
            max_allowed_memory_usage: Some(1024),
            preallocated_parsing_buffer_size: None,
        };
        let err = ResourceBudget::from_settings(Some(&only_max)).unwrap_err();
        assert!(
            err.to_string().contains("preallocated_parsing_buffer_size"),
            "got: {err}"
        );

        let both = MemorySettings {
            max_allowed_memory_usage: Some(1024),
            preallocated_parsing_buffer_size: Some(256),
        };
        assert_eq!(
            ResourceBudget::from_settings(Some(&both)).expect("valid pair"),
            Some(ResourceBudget {
                max_allowed_memory_usage: 1024,
                preallocated_parsing_buffer_size: 256
            })
        );
        assert_eq!(ResourceBudget::from_settings(None).expect("unbounded"), None);
    }

    #[test]
    fn preallocation_cannot_exceed_the_limit() {
        assert!(matches!(
            ResourceBudget::new(10, 20),
            Err(ConfigurationError::PreallocationExceedsLimit { preallocated: 20, max: 10 })
        ));
    }

    #[test]
    fn options_deserialize_strictly() {
        let options = RewriterOptions::from_value(json!({
            "memory": {"max_allowed_memory_usage": 4096, "preallocated_parsing_buffer_size": 1024},
            "document_mode": "fragment"
        }))
        .expect("valid options");
        assert_eq!(options.document_mode, DocumentMode::Fragment);
        assert_eq!(options, RewriterOptions::default().with_memory(4096, 1024).fragment());

        assert!(RewriterOptions::from_value(json!({"memory": {"max": 1}})).is_err());
        assert!(RewriterOptions::from_value(json!({"memory": {"max_allowed_memory_usage": "lots"}})).is_err());
    }
}
