//! Error types for the gateway.
//!
//! Every error surfaces to the client as a JSON body `{error, details}`
//! with an appropriate 4xx/5xx status.

use crate::response::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// No `image` field in the multipart body.
    MissingUpload,
    /// A required text field is absent.
    MissingField(&'static str),
    /// The uploaded file is not an image.
    NotAnImage(String),
    /// The upload exceeded the size cap.
    FileTooLarge,
    /// The multipart body could not be parsed.
    BadMultipart(String),
    /// The `address` field is not a valid account.
    InvalidAddress(String),
    /// The model credential is absent or malformed.
    Credential(String),
    /// The caller's on-chain balance is below one credit.
    InsufficientCredits(String),
    /// The vision model call failed.
    Upstream(String),
    /// Chain RPC communication error.
    Rpc(String),
    /// Startup configuration error.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingUpload => write!(f, "no image file provided"),
            Error::MissingField(name) => write!(f, "missing field: {name}"),
            Error::NotAnImage(mime) => write!(f, "unsupported upload type: {mime}"),
            Error::FileTooLarge => write!(f, "file too large"),
            Error::BadMultipart(msg) => write!(f, "invalid multipart body: {msg}"),
            Error::InvalidAddress(addr) => write!(f, "invalid address: {addr}"),
            Error::Credential(msg) => write!(f, "credential error: {msg}"),
            Error::InsufficientCredits(addr) => write!(f, "insufficient credits for {addr}"),
            Error::Upstream(msg) => write!(f, "upstream model error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<conjurer_chain::Error> for Error {
    fn from(err: conjurer_chain::Error) -> Self {
        Error::Rpc(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            Error::MissingUpload => (
                StatusCode::BAD_REQUEST,
                "No image file provided. Please upload an image file.".to_string(),
                "Expected a file field named \"image\"".to_string(),
            ),
            Error::MissingField(name) => (
                StatusCode::BAD_REQUEST,
                "Missing required field".to_string(),
                format!("Expected a field named \"{name}\""),
            ),
            Error::NotAnImage(mime) => (
                StatusCode::BAD_REQUEST,
                "Only image files are allowed!".to_string(),
                format!("Got content type \"{mime}\""),
            ),
            Error::FileTooLarge => (
                StatusCode::BAD_REQUEST,
                "File too large".to_string(),
                "Maximum file size is 10MB".to_string(),
            ),
            Error::BadMultipart(details) => (
                StatusCode::BAD_REQUEST,
                "Invalid multipart body".to_string(),
                details,
            ),
            Error::InvalidAddress(addr) => (
                StatusCode::BAD_REQUEST,
                "Invalid address".to_string(),
                format!("\"{addr}\" is not a valid account id"),
            ),
            Error::Credential(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OpenAI API key not configured".to_string(),
                details,
            ),
            Error::InsufficientCredits(addr) => (
                StatusCode::PAYMENT_REQUIRED,
                "Insufficient credits".to_string(),
                format!("Address {addr} has no credits remaining. Please buy credits first."),
            ),
            Error::Upstream(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate filename".to_string(),
                details,
            ),
            Error::Rpc(details) => (
                StatusCode::BAD_GATEWAY,
                "Credit ledger unavailable".to_string(),
                details,
            ),
            Error::Config(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                details,
            ),
        };
        (status, Json(ErrorResponse { error, details })).into_response()
    }
}
