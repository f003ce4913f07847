use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetrixError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown metric: {name}")]
    UnknownMetric { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Metrix operations
pub type Result<T> = std::result::Result<T, MetrixError>;

impl MetrixError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new unknown metric error
    pub fn unknown_metric<S: Into<String>>(name: S) -> Self {
        Self::UnknownMetric { name: name.into() }
    }

    /// Returns true if the caller may treat this error as "no data yet"
    pub fn is_unknown_metric(&self) -> bool {
        matches!(self, Self::UnknownMetric { .. })
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "config",
            Self::UnknownMetric { .. } => "not_found",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MetrixError::config("ttl must be positive");
        assert_eq!(err.to_string(), "Invalid configuration: ttl must be positive");
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_unknown_metric_error() {
        let err = MetrixError::unknown_metric("requests");
        assert_eq!(err.to_string(), "Unknown metric: requests");
        assert_eq!(err.category(), "not_found");
        assert!(err.is_unknown_metric());
        assert!(!MetrixError::config("x").is_unknown_metric());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MetrixError = io.into();
        assert_eq!(err.category(), "io");
    }
}
