use css::SelectorError;
use sanitizer::ConfigError;
use thiserror::Error;

/// Error type handler callbacks return; any error aborts the rewrite.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type HandlerResult = Result<(), HandlerError>;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    HandlerContract(#[from] HandlerContractError),
    #[error(transparent)]
    ResourceExhausted(#[from] MemoryLimitExceeded),
    #[error("handler #{handler} failed: {source}")]
    HandlerRuntime {
        handler: usize,
        #[source]
        source: HandlerError,
    },
    #[error("rewriter is {0} and cannot accept more input")]
    Finished(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),
    #[error("invalid sanitizer configuration: {0}")]
    Sanitizer(#[from] ConfigError),
    #[error("`{0}` must be set together with `{1}`")]
    IncompleteMemorySettings(&'static str, &'static str),
    #[error(
        "preallocated_parsing_buffer_size ({preallocated}) exceeds max_allowed_memory_usage ({max})"
    )]
    PreallocationExceedsLimit { preallocated: usize, max: usize },
    #[error("invalid rewriter options: {0}")]
    Options(#[from] serde_json::Error),
    #[error("a rewriter needs a sanitizer, at least one handler, or both")]
    NothingToDo,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerContractError {
    #[error("handler #{handler} does not provide a selector")]
    MissingSelector { handler: usize },
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("memory limit exceeded: {requested} more bytes with {used} in use, limit is {limit}")]
pub struct MemoryLimitExceeded {
    pub requested: usize,
    pub used: usize,
    pub limit: usize,
}
