use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`:all` is only valid as an attribute wildcard, not in the protocol list of {element}[{attribute}]")]
    AllInProtocolList { element: String, attribute: String },
    #[error("invalid protocol `{protocol}` in the protocol list of {element}[{attribute}]")]
    InvalidProtocol {
        element: String,
        attribute: String,
        protocol: String,
    },
    #[error("invalid {kind} name `{name}`")]
    InvalidName { kind: &'static str, name: String },
    #[error("merge expects two mappings, got {0}")]
    NotAMapping(&'static str),
    #[error("invalid sanitizer configuration: {0}")]
    Deserialize(#[from] serde_json::Error),
}
