//! HTTP request handlers.

use crate::response::{ErrorResponse, GenerateResponse, HealthResponse};
use crate::state::AppState;
use crate::Error;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use near_primitives::types::AccountId;
use std::sync::Arc;
use tracing::{info, warn};

/// Health check.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK",
        message: "Server is running",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// JSON 404 for unknown routes.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not found".to_string(),
            details: format!("Route {uri} not found"),
        }),
    )
}

struct Upload {
    bytes: Vec<u8>,
    mime_type: String,
    original_filename: String,
}

/// Generate a filename for one uploaded image.
///
/// When the credit gate is enabled: read the caller's balance, reject below
/// one credit, call the model, then debit one credit. The two chain steps
/// are separate transactions around the model call.
pub async fn generate_filename(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, Error> {
    let (upload, address) = read_upload(multipart).await?;

    info!(
        file = %upload.original_filename,
        bytes = upload.bytes.len(),
        "Processing image"
    );

    // Credit gate: check before, debit after.
    let gated_account = match &state.ledger {
        Some(ledger) => {
            let address = address.ok_or(Error::MissingField("address"))?;
            let account_id: AccountId = address
                .parse()
                .map_err(|_| Error::InvalidAddress(address.clone()))?;

            let credits = ledger.get_credits(&account_id).await?;
            if credits < 1 {
                warn!(account = %account_id, "Rejected: no credits");
                return Err(Error::InsufficientCredits(account_id.to_string()));
            }
            Some(account_id)
        }
        None => None,
    };

    let generated = state
        .vision
        .generate(&upload.bytes, &upload.mime_type)
        .await?;

    if let (Some(ledger), Some(account_id)) = (&state.ledger, &gated_account) {
        ledger.decrease_credits(account_id, 1).await?;
    }

    info!(
        file = %upload.original_filename,
        generated = %generated,
        "Filename generated"
    );

    Ok(Json(GenerateResponse {
        success: true,
        original_filename: upload.original_filename,
        image_size: upload.bytes.len(),
        mime_type: upload.mime_type,
        generated_filename: generated,
    }))
}

/// Pull the `image` file and optional `address` text out of the multipart
/// body. Only image/* uploads are accepted.
async fn read_upload(mut multipart: Multipart) -> Result<(Upload, Option<String>), Error> {
    let mut upload = None;
    let mut address = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e)),
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let mime_type = field.content_type().unwrap_or("").to_string();
                if !mime_type.starts_with("image/") {
                    return Err(Error::NotAnImage(mime_type));
                }
                let original_filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some(Upload {
                    bytes: bytes.to_vec(),
                    mime_type,
                    original_filename,
                });
            }
            Some("address") => {
                address = field.text().await.ok().map(|s| s.trim().to_string());
            }
            _ => {}
        }
    }

    let upload = upload.ok_or(Error::MissingUpload)?;
    Ok((upload, address.filter(|a| !a.is_empty())))
}

/// The body limit surfaces as a 413 inside the multipart stream; everything
/// else is a malformed body, not an oversized one.
fn multipart_error(e: MultipartError) -> Error {
    warn!(error = %e, "Multipart read failed");
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::FileTooLarge
    } else {
        Error::BadMultipart(e.body_text())
    }
}
