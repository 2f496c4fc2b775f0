//! Fixture error handling

use std::fmt;

use thiserror::Error;

/// Result alias used across the fixture library
pub type Result<T> = std::result::Result<T, FixtureError>;

/// Kind of engine resource a lookup refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Container,
    Image,
    Network,
    Service,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Container => "container",
            ResourceKind::Image => "image",
            ResourceKind::Network => "network",
            ResourceKind::Service => "service",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixture error types
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: ResourceKind, name: String },

    #[error("Container engine error: {0}")]
    Engine(#[from] bollard::errors::Error),

    #[error("Simulator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl FixtureError {
    pub fn config(msg: impl Into<String>) -> Self {
        FixtureError::Config(msg.into())
    }

    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        FixtureError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Map an engine error to `NotFound` when the engine answered 404
    pub fn from_engine(err: bollard::errors::Error, kind: ResourceKind, name: &str) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => FixtureError::not_found(kind, name),
            other => FixtureError::Engine(other),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FixtureError::NotFound { .. })
    }

    /// Short label used for metrics and reports
    pub fn kind_label(&self) -> &'static str {
        match self {
            FixtureError::Config(_) => "config",
            FixtureError::NotFound { .. } => "not_found",
            FixtureError::Engine(_) => "engine",
            FixtureError::Http(_) => "http",
            FixtureError::Io(_) => "io",
            FixtureError::Payload(_) => "payload",
        }
    }
}
