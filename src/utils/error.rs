use thiserror::Error;

/// 寫入產物檔案時，失敗結果前綴的固定文字
pub const GENERATION_ERROR_PREFIX: &str = "Error during API request: ";

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    FileSystem,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl GeneratorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GeneratorError::HttpClientError(_) => ErrorCategory::Network,
            GeneratorError::IoError(_) => ErrorCategory::FileSystem,
            GeneratorError::SerializationError(_) => ErrorCategory::Data,
            GeneratorError::ConfigValidationError { .. }
            | GeneratorError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Network => ErrorSeverity::High,
            ErrorCategory::FileSystem => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GeneratorError::HttpClientError(_) => {
                "Check the TLS setup and request timeout of the HTTP client"
            }
            GeneratorError::IoError(_) => {
                "Check that the output directory is writable and the disk is not full"
            }
            GeneratorError::SerializationError(_) => "Re-run without --json to see the raw output",
            GeneratorError::ConfigValidationError { .. } => {
                "Fix the configuration file and make sure it is valid TOML"
            }
            GeneratorError::InvalidConfigValueError { .. } => {
                "Correct the reported value via the config file or command line"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GeneratorError::IoError(e) => format!("Could not write generated files: {}", e),
            GeneratorError::HttpClientError(e) => {
                format!("Could not create the HTTP client: {}", e)
            }
            GeneratorError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

/// 單次 API 呼叫的失敗原因；不會以 `Err` 離開 pipeline
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{0}")]
    Transport(reqwest::Error),

    #[error("{status} returned by API{}", detail(.message, ": ", ""))]
    Status {
        status: reqwest::StatusCode,
        message: Option<String>,
    },

    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response contained no candidate text{}", detail(.reason, " (", ")"))]
    MissingText { reason: Option<String> },

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn detail(value: &Option<String>, open: &str, close: &str) -> String {
    value
        .as_deref()
        .map(|v| format!("{}{}{}", open, v, close))
        .unwrap_or_default()
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        // 請求 URL 內含 API key，不可出現在錯誤訊息中
        GenerationError::Transport(err.without_url())
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
