use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input is missing required columns: {}", missing.join(", "))]
    SchemaError { missing: Vec<String> },

    #[error("Failed to load {path}: {message}")]
    LoadError { path: String, message: String },

    #[error("Extraction service returned {status}: {body}")]
    ServiceError { status: u16, body: String },

    #[error("Extraction failed after {attempts} attempts: {last_error}")]
    ExtractionFailed { attempts: u32, last_error: String },

    #[error("Response could not be parsed: {message}")]
    ParseFailed { message: String },

    #[error("Failed to write {path}: {message}")]
    PersistError { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Service,
    Parsing,
    Persistence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::SchemaError { .. } | EtlError::LoadError { .. } | EtlError::CsvError(_) => {
                ErrorCategory::Input
            }
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::ServiceError { .. } | EtlError::ExtractionFailed { .. } => {
                ErrorCategory::Service
            }
            EtlError::ParseFailed { .. } | EtlError::SerializationError(_) => {
                ErrorCategory::Parsing
            }
            EtlError::PersistError { .. } | EtlError::IoError(_) => ErrorCategory::Persistence,
        }
    }

    /// 批次層級的錯誤只會導致該批次被略過
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::ParseFailed { .. } => ErrorSeverity::Low,
            EtlError::ApiError(_)
            | EtlError::ServiceError { .. }
            | EtlError::ExtractionFailed { .. } => ErrorSeverity::Medium,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::SchemaError { .. }
            | EtlError::LoadError { .. }
            | EtlError::CsvError(_)
            | EtlError::SerializationError(_) => ErrorSeverity::High,
            EtlError::PersistError { .. } | EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("Set {} in the environment or in a .env file", field)
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Check the value passed for --{}", field.replace('_', "-"))
            }
            EtlError::ConfigError { .. } => "Review the command-line flags".to_string(),
            EtlError::SchemaError { .. } => {
                "The input must contain 'Article Title' and 'Abstract' columns".to_string()
            }
            EtlError::LoadError { .. } | EtlError::CsvError(_) => {
                "Make sure the input file exists and is a valid UTF-8 CSV file".to_string()
            }
            EtlError::ApiError(_) | EtlError::ServiceError { .. } => {
                "Check network connectivity, the API base URL and the API key".to_string()
            }
            EtlError::ExtractionFailed { .. } => {
                "Increase --max-attempts or --timeout-secs, or retry later".to_string()
            }
            EtlError::ParseFailed { .. } | EtlError::SerializationError(_) => {
                "Try a model that follows JSON-only instructions more reliably".to_string()
            }
            EtlError::PersistError { .. } | EtlError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => format!("Required setting {} is not set", field),
            EtlError::SchemaError { missing } => {
                format!("Input file is missing column(s): {}", missing.join(", "))
            }
            EtlError::LoadError { path, .. } => format!("Could not read input file {}", path),
            EtlError::PersistError { path, .. } => format!("Could not write output file {}", path),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
