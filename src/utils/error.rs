use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing input: {part}")]
    MissingInputError { part: String },

    #[error("Invalid input: {message}")]
    InputError { message: String },

    #[error("Could not locate {keyword} data: {message}")]
    ResolutionError { keyword: String, message: String },

    #[error("Malformed {format} in '{origin}': {message}")]
    FormatError {
        origin: String,
        format: String,
        message: String,
    },

    #[error("Alternate backend failed: {message}")]
    BackendError {
        message: String,
        exit_code: Option<i32>,
        stderr: String,
    },

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
}

pub type Result<T> = std::result::Result<T, AuditError>;

/// 錯誤分類，決定回應給呼叫端的訊息與狀態碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Resolution,
    Format,
    Backend,
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

impl ErrorSeverity {
    /// CLI 結束碼：Low 視為成功，其餘依嚴重程度區分
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing the files.";

impl AuditError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputError {
            message: message.into(),
        }
    }

    pub fn missing_input(part: impl Into<String>) -> Self {
        Self::MissingInputError { part: part.into() }
    }

    pub fn format(
        origin: impl Into<String>,
        format: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::FormatError {
            origin: origin.into(),
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingInputError { .. } | Self::InputError { .. } => ErrorCategory::Input,
            Self::ResolutionError { .. } => ErrorCategory::Resolution,
            Self::FormatError { .. } => ErrorCategory::Format,
            Self::BackendError { .. } => ErrorCategory::Backend,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ZipError(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Resolution | ErrorCategory::Format => {
                ErrorSeverity::High
            }
            ErrorCategory::Backend => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 呼叫端的問題回 400，後端或內部錯誤回 500
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Input | ErrorCategory::Resolution | ErrorCategory::Format
        )
    }

    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    /// 給使用者看的訊息；伺服器端錯誤只回通用訊息，細節留在日誌
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingInputError { part } => {
                format!("Both following and followers files are required (missing '{part}').")
            }
            Self::InputError { message } => message.clone(),
            Self::ResolutionError { keyword, .. } => format!(
                "Could not find {keyword} data in the export. Make sure the export was requested \
                 with the Followers and following information selected, in JSON or HTML format."
            ),
            Self::FormatError { origin, format, .. } => {
                format!("'{origin}' is not a valid {format} export file.")
            }
            Self::BackendError { .. } => "Failed to execute the comparison backend.".to_string(),
            Self::ConfigError { message } => format!("Configuration error: {message}"),
            Self::ConfigValidationError { field, message } => {
                format!("Configuration '{field}' is invalid: {message}")
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration '{field}' is invalid: {reason}")
            }
            Self::MissingConfigError { field } => {
                format!("Configuration '{field}' is required.")
            }
            Self::ZipError(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::SerializationError(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Upload either one ZIP export or both the following and followers files."
            }
            ErrorCategory::Resolution => {
                "Request a new export that includes followers and following, in JSON format if possible."
            }
            ErrorCategory::Format => {
                "Upload the files exactly as they came out of the export, without editing them."
            }
            ErrorCategory::Backend => {
                "Check the backend executable and its logs, or run without --backend."
            }
            ErrorCategory::Configuration => "Fix the configuration value and run again.",
            ErrorCategory::Internal => "Check file permissions and available disk space.",
        }
    }
}
