//! Error types for Senz Core

use thiserror::Error;

/// Errors that can occur while parsing requests or running a computation
#[derive(Debug, Error)]
pub enum SenzError {
    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Invalid scale type: {0}")]
    InvalidScaleType(String),

    #[error("Scale value {value} out of range for {scale_type}")]
    InvalidScaleValue { scale_type: String, value: i64 },

    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    #[error("Unknown timeline: {0}")]
    UnknownTimeline(String),

    #[error("No timeline qualifies as primary and no fallback key was given")]
    NoPrimaryTimeline,

    #[error("Empty {category} distribution in slot {slot}")]
    EmptyDistribution { slot: usize, category: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SenzError {
    /// Shorthand for an `InvalidField` error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SenzError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the request rather than by the computation
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            SenzError::JsonError(_)
                | SenzError::EmptyDistribution { .. }
                | SenzError::ConfigError(_)
        )
    }
}

impl From<figment::Error> for SenzError {
    fn from(e: figment::Error) -> Self {
        SenzError::ConfigError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_split() {
        assert!(SenzError::MissingField("filter".to_string()).is_client_error());
        assert!(SenzError::InvalidStrategy("FOO".to_string()).is_client_error());
        assert!(SenzError::UnknownTimeline("HK".to_string()).is_client_error());
        assert!(!SenzError::EmptyDistribution {
            slot: 0,
            category: "motion".to_string()
        }
        .is_client_error());

        let json_failure = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!SenzError::from(json_failure).is_client_error());
    }

    #[test]
    fn test_display_messages() {
        let err = SenzError::invalid("timelines.PK[0].timestamp", "expected integer");
        assert_eq!(
            err.to_string(),
            "Invalid field timelines.PK[0].timestamp: expected integer"
        );
        assert_eq!(
            SenzError::MissingField("senzList".to_string()).to_string(),
            "Missing required field: senzList"
        );
    }
}
