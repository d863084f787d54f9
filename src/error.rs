use std::fmt;

#[derive(Debug)]
pub enum GatewayError {
    ApiError {
        status: u16,
        message: String,
    },
    BackendError(String),
    InvalidInput(String),
    ConfigError(String),
    StoreError(String),
    NetworkError(reqwest::Error),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl GatewayError {
    /// Errors that are safe to show verbatim to whoever sent the request.
    pub fn is_caller_facing(&self) -> bool {
        matches!(self, GatewayError::InvalidInput(_))
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::ApiError { status, message } => {
                write!(f, "Model API error (status {}): {}", status, message)
            }
            GatewayError::BackendError(msg) => write!(f, "Database backend error: {}", msg),
            GatewayError::InvalidInput(msg) => write!(f, "{}", msg),
            GatewayError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            GatewayError::StoreError(msg) => write!(f, "Conversation store error: {}", msg),
            GatewayError::NetworkError(e) => write!(f, "Network error: {}", e),
            GatewayError::IoError(e) => write!(f, "IO error: {}", e),
            GatewayError::JsonError(e) => write!(f, "JSON error: {}", e),
            GatewayError::YamlError(e) => write!(f, "YAML error: {}", e),
            GatewayError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::NetworkError(e) => Some(e),
            GatewayError::IoError(e) => Some(e),
            GatewayError::JsonError(e) => Some(e),
            GatewayError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::NetworkError(err)
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::IoError(err)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for GatewayError {
    fn from(err: serde_yaml::Error) -> Self {
        GatewayError::YamlError(err)
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(err: anyhow::Error) -> Self {
        GatewayError::Other(format!("{:#}", err))
    }
}

impl From<String> for GatewayError {
    fn from(msg: String) -> Self {
        GatewayError::Other(msg)
    }
}

impl From<&str> for GatewayError {
    fn from(msg: &str) -> Self {
        GatewayError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
