//! Signing key loading in the near-cli key file format.

use crate::Error;
use near_crypto::{SecretKey, Signer};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

#[derive(serde::Deserialize)]
struct KeyFile {
    account_id: String,
    #[serde(alias = "private_key")]
    secret_key: String,
}

/// Parse a near-cli key JSON: either a single object or an array of
/// `{"account_id": "...", "public_key": "...", "secret_key": "..."}`.
pub fn signer_from_json(json: &str) -> Result<Signer, Error> {
    let key: KeyFile = if json.trim().starts_with('[') {
        let keys: Vec<KeyFile> = serde_json::from_str(json)
            .map_err(|e| Error::Key(format!("Invalid key JSON: {e}")))?;
        keys.into_iter()
            .next()
            .ok_or_else(|| Error::Key("Empty key array".to_string()))?
    } else {
        serde_json::from_str(json).map_err(|e| Error::Key(format!("Invalid key JSON: {e}")))?
    };

    let secret_key = SecretKey::from_str(&key.secret_key)
        .map_err(|e| Error::Key(format!("Invalid secret key: {e}")))?;
    let account_id = key
        .account_id
        .parse()
        .map_err(|e| Error::Key(format!("Invalid account: {e}")))?;

    let signer = near_crypto::InMemorySigner::from_secret_key(account_id, secret_key);
    info!(account = %signer.get_account_id(), "Loaded signing key");
    Ok(signer)
}

/// Load a signer from a key file on disk.
pub fn signer_from_file(path: &Path) -> Result<Signer, Error> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Key(format!("Failed to read {}: {e}", path.display())))?;
    signer_from_json(&content)
}

/// Load a signer from an env var holding key JSON, falling back to a file.
pub fn load_signer(env_var: &str, path: &str) -> Result<Signer, Error> {
    if let Ok(keys_json) = std::env::var(env_var) {
        if !keys_json.is_empty() {
            return signer_from_json(&keys_json);
        }
    }
    signer_from_file(Path::new(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> String {
        SecretKey::from_seed(near_crypto::KeyType::ED25519, "test").to_string()
    }

    #[test]
    fn parses_single_object() {
        let json = format!(
            r#"{{"account_id": "owner.testnet", "secret_key": "{}"}}"#,
            test_key()
        );
        let signer = signer_from_json(&json).unwrap();
        assert_eq!(signer.get_account_id().as_str(), "owner.testnet");
    }

    #[test]
    fn parses_array_takes_first() {
        let json = format!(
            r#"[{{"account_id": "owner.testnet", "private_key": "{}"}}]"#,
            test_key()
        );
        let signer = signer_from_json(&json).unwrap();
        assert_eq!(signer.get_account_id().as_str(), "owner.testnet");
    }

    #[test]
    fn rejects_empty_array() {
        assert!(matches!(signer_from_json("[]"), Err(Error::Key(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(signer_from_json("not json"), Err(Error::Key(_))));
    }
}
