use axum::{
    Json,
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::process_url;
use crate::api::{ProcessUrlRequest, ProcessUrlResponse};
use crate::bad_request;

// The body is decoded by hand so that a missing or wrong Content-Type
// does not turn well-formed JSON into a rejection.
pub async fn process(body: Bytes) -> Response {
    let req: ProcessUrlRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::info!("invalid request body: {}", e);
            return bad_request("Invalid request body");
        }
    };

    if req.url.is_empty() || req.operation.is_empty() {
        return bad_request("Missing url or operation");
    }

    match process_url(&req.url, &req.operation) {
        Ok(processed_url) => {
            tracing::info!(operation = %req.operation, "processed url");
            (StatusCode::OK, Json(ProcessUrlResponse { processed_url })).into_response()
        }
        Err(e) => {
            tracing::info!(url = %req.url, operation = %req.operation, "processing error: {}", e);
            bad_request(&e.to_string())
        }
    }
}
