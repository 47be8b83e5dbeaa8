use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(msg: &str) -> Self {
        StatusResponse {
            status: msg.to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: &str) -> Self {
        ErrorResponse { error: msg.to_owned() }
    }
}

// Missing fields decode as empty strings so the handler can report them
// with a single message.
#[derive(Debug, Deserialize)]
pub struct ProcessUrlRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub operation: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessUrlResponse {
    pub processed_url: String,
}
