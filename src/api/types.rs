use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub host: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectResponse {
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RowKeysResponse {
    #[serde(default)]
    pub rowkeys: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDataRequest {
    pub table: String,
    pub row_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFamilyRequest {
    pub table: String,
    pub family_name: String,
}

/// Error payload every failing endpoint is expected to send.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// Pull a non-empty `{error}` message out of a response body, if it has one.
    pub fn extract(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .map(|payload| payload.error)
            .filter(|message| !message.trim().is_empty())
    }
}
