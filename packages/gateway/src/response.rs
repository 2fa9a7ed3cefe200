//! Response types for the gateway API.

use serde::Serialize;

/// Response from the generate-filename endpoint. Field names follow the
/// original client-facing API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub original_filename: String,
    pub generated_filename: String,
    pub image_size: usize,
    pub mime_type: String,
}

/// Response from the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

/// JSON error body shared by all failure paths.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}
