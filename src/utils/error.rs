use thiserror::Error;

#[derive(Error, Debug)]
pub enum SorterError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SorterError {
    pub fn config(message: impl Into<String>) -> Self {
        SorterError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SorterError::ApiError(_) => ErrorCategory::Network,
            SorterError::IoError(_) => ErrorCategory::Storage,
            SorterError::CsvError(_)
            | SorterError::SerializationError(_)
            | SorterError::ProcessingError { .. } => ErrorCategory::Data,
            SorterError::ConfigError { .. }
            | SorterError::ConfigValidationError { .. }
            | SorterError::InvalidConfigValueError { .. }
            | SorterError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SorterError::ApiError(_) => "Check that the remote sorter endpoint is reachable",
            SorterError::IoError(_) => "Check that the paths exist and are readable/writable",
            SorterError::CsvError(_) | SorterError::SerializationError(_) => {
                "Check the output format and the data being written"
            }
            SorterError::ConfigError { .. } => {
                "Check the syllabus file and the program_years setting"
            }
            SorterError::ConfigValidationError { .. }
            | SorterError::InvalidConfigValueError { .. }
            | SorterError::MissingConfigError { .. } => {
                "Fix the reported field in the TOML configuration"
            }
            SorterError::ProcessingError { .. } => "Re-run with --verbose for more details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach the remote sorter: {}", self),
            ErrorCategory::Storage => format!("File system problem: {}", self),
            ErrorCategory::Data => format!("Could not process the data: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SorterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_critical() {
        let err = SorterError::config("missing First Year Engineering");
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("First Year Engineering"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SorterError = io.into();
        assert_eq!(err.category(), ErrorCategory::Storage);
    }
}
