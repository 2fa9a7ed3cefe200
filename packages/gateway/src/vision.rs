//! Vision-model filename generation.
//!
//! One chat-completion round trip per image: no retry, no streaming, no
//! batching. The image travels as a base64 data URL at low detail.

use crate::Error;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// Returned when the model produces no usable content.
pub const FALLBACK_NAME: &str = "unknown-name";

const MAX_COMPLETION_TOKENS: u32 = 50;
const MAX_WORDS: usize = 8;

const SYSTEM_PROMPT: &str = "You are a filename generation bot. You must return only a filename based on the attached image. No explanations. No descriptions. No punctuation. No quotes. No code blocks. Just a lowercase hyphenated filename of 3 to 8 words in plain text.";

const USER_PROMPT: &str = r#"Analyze the attached image and generate a short, descriptive filename that clearly reflects its subject, context, and content.
Rules:
    1. Use lowercase letters only. Separate words with hyphens. No spaces or underscores.
    2. Keep the filename between 3 to 8 words. Be concise but meaningful.
    3. Apply intelligent context recognition:
        - If it is an album cover, include the album title and band or artist name.
        - If it is artwork, mention the style (e.g., oil-painting, digital-art, 3d-render).
        - If it's a poster, include the movie/show/event name.
    4. Avoid generic terms like "image", "picture", "photo", or "screenshot".
    5. Do not include the file extension (e.g., .jpg or .png) in the output.

Return only the final filename string, with no extra explanation or punctuation."#;

/// Seam between the HTTP handlers and the model backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FilenameGenerator: Send + Sync {
    async fn generate(&self, image: &[u8], mime_type: &str) -> Result<String, Error>;
}

/// OpenAI-compatible chat completions client.
pub struct VisionClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl VisionClient {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    /// Credential checks are deferred to request time so a misconfigured
    /// deployment serves a descriptive 500 instead of failing to boot.
    fn check_credentials(&self) -> Result<(), Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Credential(
                "Please set the OPENAI_API_KEY environment variable".to_string(),
            ));
        }
        if !self.api_key.starts_with("sk-") {
            return Err(Error::Credential(
                "Invalid OpenAI API key format. API key should start with \"sk-\"".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FilenameGenerator for VisionClient {
    async fn generate(&self, image: &[u8], mime_type: &str) -> Result<String, Error> {
        self.check_credentials()?;

        let encoded = STANDARD.encode(image);
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": USER_PROMPT },
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": format!("data:{mime_type};base64,{encoded}"),
                                "detail": "low"
                            }
                        }
                    ]
                }
            ],
            "max_completion_tokens": MAX_COMPLETION_TOKENS
        });

        debug!(model = %self.model, bytes = image.len(), "Requesting filename");

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("model request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "model returned status {status}: {detail}"
            )));
        }

        let completion: Completion = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("invalid model response: {e}")))?;

        let raw = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .unwrap_or_default();

        if raw.is_empty() {
            info!("Model returned no content, using fallback name");
            return Ok(FALLBACK_NAME.to_string());
        }

        Ok(normalize_filename(raw))
    }
}

/// Normalize a model reply into a lowercase hyphenated filename: strips
/// wrapping quotes and a trailing image extension, maps separators to
/// hyphens, drops everything that is not `[a-z0-9-]`, and caps the result
/// at eight words.
pub fn normalize_filename(raw: &str) -> String {
    let mut name = raw.trim().trim_matches(['"', '\'', '`']).to_lowercase();

    for ext in [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".tiff"] {
        if let Some(stripped) = name.strip_suffix(ext) {
            name = stripped.to_string();
            break;
        }
    }

    let cleaned: String = name
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '-',
        })
        .collect();

    let words: Vec<&str> = cleaned
        .split('-')
        .filter(|w| !w.is_empty())
        .take(MAX_WORDS)
        .collect();

    if words.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    words.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hyphenated_lowercase(name: &str) -> bool {
        let words: Vec<&str> = name.split('-').collect();
        !words.is_empty()
            && words.len() <= MAX_WORDS
            && words.iter().all(|w| {
                !w.is_empty() && w.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            })
    }

    #[test]
    fn passes_through_well_formed_names() {
        assert_eq!(
            normalize_filename("golden-retriever-park-sunset"),
            "golden-retriever-park-sunset"
        );
    }

    #[test]
    fn lowercases_and_rehyphenates() {
        assert_eq!(
            normalize_filename("Golden Retriever Park_Sunset"),
            "golden-retriever-park-sunset"
        );
    }

    #[test]
    fn strips_quotes_and_extension() {
        assert_eq!(
            normalize_filename("\"abbey-road-the-beatles.jpg\""),
            "abbey-road-the-beatles"
        );
    }

    #[test]
    fn drops_punctuation() {
        assert_eq!(
            normalize_filename("sunset, over: the (bay)!"),
            "sunset-over-the-bay"
        );
    }

    #[test]
    fn caps_at_eight_words() {
        let long = "one two three four five six seven eight nine ten";
        assert_eq!(
            normalize_filename(long),
            "one-two-three-four-five-six-seven-eight"
        );
    }

    #[test]
    fn empty_input_falls_back() {
        assert_eq!(normalize_filename("???"), FALLBACK_NAME);
        assert_eq!(normalize_filename(""), FALLBACK_NAME);
    }

    fn client_with_key(key: &str) -> VisionClient {
        VisionClient::new(
            "http://localhost/unused".to_string(),
            key.to_string(),
            "gpt-4o-mini".to_string(),
        )
    }

    #[test]
    fn empty_api_key_is_rejected() {
        match client_with_key("").check_credentials() {
            Err(Error::Credential(msg)) => {
                assert_eq!(msg, "Please set the OPENAI_API_KEY environment variable");
            }
            other => panic!("expected credential error, got {other:?}"),
        }
    }

    #[test]
    fn non_sk_api_key_is_rejected() {
        match client_with_key("pk-wrong-prefix").check_credentials() {
            Err(Error::Credential(msg)) => {
                assert!(msg.starts_with("Invalid OpenAI API key format"));
            }
            other => panic!("expected credential error, got {other:?}"),
        }
    }

    #[test]
    fn sk_prefixed_key_is_accepted() {
        assert!(client_with_key("sk-test-key").check_credentials().is_ok());
    }

    #[test]
    fn output_always_matches_filename_shape() {
        for raw in [
            "Golden Retriever At The Park",
            "  oil_painting-of-a-storm.PNG ",
            "a",
            "3d-render spaceship !!!",
        ] {
            assert!(is_hyphenated_lowercase(&normalize_filename(raw)));
        }
    }
}
