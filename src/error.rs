use thiserror::Error;

/// Failure of a single call against the data source REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Backend returned HTTP {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The backend's own `{error}` message when it sent one, otherwise `fallback`
    /// with whatever detail the failure carries.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Status { status, message: None } => format!("{} (HTTP {})", fallback, status),
            ApiError::Transport(e) => format!("{}: {}", fallback, e),
            ApiError::InvalidUrl(e) => format!("{}: {}", fallback, e),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Connect(String),

    #[error("{0}")]
    List(String),

    #[error("{0}")]
    Query(String),

    #[error("{0}")]
    Mutation(String),

    #[error("{0}")]
    Delete(String),

    #[error("No data source is active")]
    NoActiveDataSource,

    #[error("Data source not found: {0}")]
    NotFound(String),

    #[error("Operation already in progress: {0}")]
    Busy(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl ClientError {
    /// Short category label used when logging failures.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "validation",
            ClientError::Upload(_) => "upload",
            ClientError::Connect(_) => "connect",
            ClientError::List(_) => "list",
            ClientError::Query(_) => "query",
            ClientError::Mutation(_) => "mutation",
            ClientError::Delete(_) => "delete",
            ClientError::NoActiveDataSource => "no_active_data_source",
            ClientError::NotFound(_) => "not_found",
            ClientError::Busy(_) => "busy",
            ClientError::Storage(_) => "storage",
            ClientError::Json(_) => "json",
            ClientError::Api(_) => "api",
        }
    }
}
