//! HTTP client for the Conjurer gateway.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReply {
    pub success: bool,
    pub original_filename: String,
    pub generated_filename: String,
    pub image_size: usize,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthReply {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
    details: String,
}

pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn health(&self) -> Result<HealthReply> {
        let reply = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Gateway unreachable")?
            .json()
            .await
            .context("Invalid health response")?;
        Ok(reply)
    }

    /// Upload one image and get its suggested filename.
    pub async fn generate_filename(
        &self,
        image_path: &Path,
        address: Option<&str>,
    ) -> Result<GenerateReply> {
        let bytes = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("Failed to read {}", image_path.display()))?;

        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let mime = mime_for(image_path)
            .ok_or_else(|| anyhow!("{} is not an image file", image_path.display()))?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)?;
        let mut form = reqwest::multipart::Form::new().part("image", part);
        if let Some(address) = address {
            form = form.text("address", address.to_string());
        }

        let response = self
            .http
            .post(format!("{}/generate-filename", self.base_url))
            .multipart(form)
            .send()
            .await
            .context("Gateway unreachable")?;

        if !response.status().is_success() {
            let status = response.status();
            if let Ok(err) = response.json::<ErrorReply>().await {
                bail!("{} ({}): {}", err.error, status, err.details);
            }
            bail!("Gateway returned status {status}");
        }

        let reply = response
            .json::<GenerateReply>()
            .await
            .context("Invalid gateway response")?;
        Ok(reply)
    }
}

/// MIME type by extension; `None` for anything that is not an image.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())?
        .as_str()
    {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// Visible files with a known image extension.
pub fn is_image_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    if hidden {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn recognizes_image_extensions() {
        assert!(is_image_file(&PathBuf::from("/tmp/shot.PNG")));
        assert!(is_image_file(&PathBuf::from("cover.jpeg")));
        assert!(!is_image_file(&PathBuf::from("notes.txt")));
        assert!(!is_image_file(&PathBuf::from("no_extension")));
    }

    #[test]
    fn skips_hidden_files() {
        assert!(!is_image_file(&PathBuf::from("/tmp/.screenshot.png")));
        assert!(!is_image_file(&PathBuf::from(".DS_Store")));
    }

    #[test]
    fn maps_mime_types() {
        assert_eq!(mime_for(&PathBuf::from("a.jpg")), Some("image/jpeg"));
        assert_eq!(mime_for(&PathBuf::from("a.webp")), Some("image/webp"));
        assert_eq!(mime_for(&PathBuf::from("a.pdf")), None);
    }
}
