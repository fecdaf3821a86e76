use thiserror::Error;

#[derive(Error, Debug)]
pub enum InclusionError {
    #[error("Source listing unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("No zone documents found: {message}")]
    NoDocumentsFound { message: String },

    #[error("Failed to fetch document for zone '{zone}': {message}")]
    DocumentFetchFailed { zone: String, message: String },

    #[error("Cannot extract text from document: {message}")]
    TextExtractionFailed { message: String },

    #[error("Cannot write artifact {name}: {source}")]
    SerializationIo {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot delete artifact {name}: {source}")]
    DeleteFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Storage,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl InclusionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceUnavailable { .. }
            | Self::NoDocumentsFound { .. }
            | Self::DocumentFetchFailed { .. }
            | Self::TextExtractionFailed { .. }
            | Self::HttpError(_) => ErrorCategory::Upstream,
            Self::SerializationIo { .. } | Self::DeleteFailed { .. } | Self::IoError(_) => {
                ErrorCategory::Storage
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 上游暫時無資料，視同「沒有變更」
            Self::SourceUnavailable { .. } | Self::NoDocumentsFound { .. } => ErrorSeverity::Low,
            Self::DeleteFailed { .. } => ErrorSeverity::Low,
            Self::DocumentFetchFailed { .. }
            | Self::TextExtractionFailed { .. }
            | Self::HttpError(_) => ErrorSeverity::Medium,
            Self::SerializationIo { .. } | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorSeverity::High
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 是否應該當作「沒有變更」處理，而不是失敗
    pub fn is_no_change(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::NoDocumentsFound { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => {
                "The regulator page may be down or its layout changed; the next scheduled run will retry"
            }
            Self::NoDocumentsFound { .. } => "Check the configured language code and source URL",
            Self::DocumentFetchFailed { .. } | Self::HttpError(_) => {
                "Retry later; the previous inclusion list stays available"
            }
            Self::SerializationIo { .. } | Self::IoError(_) => {
                "Check that the data directory exists and is writable"
            }
            Self::TextExtractionFailed { .. } => {
                "Build with the `pdf` feature or point the source at pre-extracted text documents"
            }
            Self::DeleteFailed { .. } => "Remove the stale artifact manually if it persists",
            Self::SerializationError(_) => "The publication state file may be corrupt; remove meta.json to reset it",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::SourceUnavailable { .. } | Self::NoDocumentsFound { .. } => {
                "No new publication could be read from the regulator; nothing changed".to_string()
            }
            Self::DocumentFetchFailed { zone, .. } => {
                format!("Could not download the document for zone '{}'; no new list this cycle", zone)
            }
            Self::SerializationIo { name, .. } => {
                format!("Could not write {}; the previous list remains available", name)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InclusionError>;
