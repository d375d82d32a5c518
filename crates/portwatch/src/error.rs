use thiserror::Error;

/// Rejected resource input. Raised before any probe or persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid URL: the host cannot be empty")]
    EmptyUrl,

    #[error("Invalid port {0}: must be between 1 and 65535")]
    InvalidPort(i64),

    #[error("Invalid port '{0}': not a number")]
    PortNotNumeric(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A resource for {url}:{port} is already being monitored")]
    DuplicateResource { url: String, port: u16 },

    #[error("No resource found for {url}:{port}")]
    NotFound { url: String, port: u16 },

    #[error("Resource index {index} is out of range (collection holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Persistence failed: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Faults raised by a prober. An unreachable endpoint is not one of these.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Transport failure: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write configuration: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No configuration directory available (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
}

/// Failure of a user-facing registration or on-demand check
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

impl From<ValidationError> for RegistryError {
    fn from(err: ValidationError) -> Self {
        RegistryError::Store(StoreError::Validation(err))
    }
}
