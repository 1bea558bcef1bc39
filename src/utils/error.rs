use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Malformed response ({context}): {reason}")]
    MalformedResponse { context: String, reason: String },

    #[error("Wiki API returned error '{code}': {info}")]
    ApiResponse { code: String, info: String },

    #[error("Login failed: {reason}")]
    LoginFailed { reason: String },

    #[error("No target-time found in section {section} of [[{document}]]")]
    ExtractionFailed { document: String, section: String },

    #[error("Unparseable target-time '{value}' in section {section} of [[{document}]]")]
    InvalidTimestamp {
        document: String,
        section: String,
        value: String,
    },

    #[error("Failed to write [[{page}]]: {reason}")]
    WriteFailed { page: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AuditError {
    pub fn malformed(context: impl Into<String>, reason: impl ToString) -> Self {
        AuditError::MalformedResponse {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AuditError::ApiError(_)
            | AuditError::ApiResponse { .. }
            | AuditError::LoginFailed { .. }
            | AuditError::WriteFailed { .. } => ErrorCategory::Network,
            AuditError::ConfigError { .. }
            | AuditError::ConfigValidationError { .. }
            | AuditError::InvalidConfigValueError { .. }
            | AuditError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AuditError::MalformedResponse { .. }
            | AuditError::ExtractionFailed { .. }
            | AuditError::InvalidTimestamp { .. } => ErrorCategory::Data,
            AuditError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一段落的問題，只會被跳過
            AuditError::ExtractionFailed { .. } | AuditError::InvalidTimestamp { .. } => {
                ErrorSeverity::Low
            }
            AuditError::ApiError(_) | AuditError::WriteFailed { .. } => ErrorSeverity::Medium,
            AuditError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AuditError::ApiError(_) => "Check network connectivity and the api_endpoint setting, then rerun",
            AuditError::ApiResponse { .. } => "Inspect the API error code; the account may lack rights or the request was rejected",
            AuditError::LoginFailed { .. } => "Verify the bot username and bot password in [credentials]",
            AuditError::WriteFailed { .. } => "Check that the account may edit the report page and that it is not protected",
            AuditError::MalformedResponse { .. } => {
                "The wiki returned an unexpected response; check the API version and rerun with --verbose"
            }
            AuditError::ExtractionFailed { .. } | AuditError::InvalidTimestamp { .. } => {
                "Fix the template's target-time parameter on the listed page"
            }
            AuditError::ConfigError { .. }
            | AuditError::ConfigValidationError { .. }
            | AuditError::InvalidConfigValueError { .. }
            | AuditError::MissingConfigError { .. } => "Review the configuration file and command line flags",
            AuditError::IoError(_) => "Check file permissions and that the configuration path exists",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Wiki communication failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
