use thiserror::Error;

/// Unified error type for the reactor-install library
#[derive(Debug, Error)]
pub enum CoordError {
    /// An artifact set failed to install into the local store
    #[error("Failed to install artifacts of {coordinates}")]
    Install {
        coordinates: String,
        #[source]
        source: anyhow::Error,
    },

    /// One or more deferred installs failed during the end-of-build drain
    #[error("Deferred install drain failed for: {}", failed.join(", "))]
    Drain {
        failed: Vec<String>,
        #[source]
        source: anyhow::Error,
    },

    /// Coordinator misuse (reactor size mismatch and similar)
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl CoordError {
    /// Create an install error wrapping a collaborator failure
    pub fn install<S: Into<String>>(coordinates: S, source: anyhow::Error) -> Self {
        Self::Install {
            coordinates: coordinates.into(),
            source,
        }
    }

    /// Create a drain error summarizing the projects whose install failed
    pub fn drain(failed: Vec<String>, source: anyhow::Error) -> Self {
        Self::Drain { failed, source }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Coordinates of the project whose install failed, if this error
    /// originated from a single install invocation
    pub fn coordinates(&self) -> Option<&str> {
        match self {
            Self::Install { coordinates, .. } => Some(coordinates),
            _ => None,
        }
    }

    /// Whether this error carries a collaborator install failure,
    /// directly or wrapped in a drain summary
    pub fn is_install_failure(&self) -> bool {
        matches!(self, Self::Install { .. } | Self::Drain { .. })
    }
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, CoordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoordError::install("org.example:core:1.0", anyhow::anyhow!("disk full"));
        assert_eq!(
            err.to_string(),
            "Failed to install artifacts of org.example:core:1.0"
        );
        assert_eq!(err.coordinates(), Some("org.example:core:1.0"));
    }

    #[test]
    fn test_drain_display_lists_failed_projects() {
        let err = CoordError::drain(
            vec!["a:a:1".to_string(), "b:b:2".to_string()],
            anyhow::anyhow!("first failure"),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("a:a:1"));
        assert!(rendered.contains("b:b:2"));
    }

    #[test]
    fn test_error_classification() {
        assert!(CoordError::install("g:a:1", anyhow::anyhow!("boom")).is_install_failure());
        assert!(!CoordError::configuration("bad reactor size").is_install_failure());
        assert_eq!(CoordError::configuration("x").coordinates(), None);
    }

    #[test]
    fn test_source_chain_preserved() {
        let cause = anyhow::anyhow!("checksum mismatch");
        let err = CoordError::install("g:a:1", cause);
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("checksum mismatch"));
    }
}
