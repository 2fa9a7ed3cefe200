//! Gateway configuration.

/// Configuration for the filename gateway, read from the environment once
/// at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,

    /// OpenAI-compatible chat completions endpoint.
    pub openai_api_url: String,
    pub openai_api_key: String,
    pub openai_model: String,

    pub rpc_url: String,
    /// Credit ledger account. The credit gate is disabled when unset.
    pub contract_id: Option<String>,
    pub keys_path: String,
    pub gas_tgas: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_address: defaults::bind_address(),
            openai_api_url: defaults::openai_api_url(),
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: defaults::openai_model(),
            rpc_url: defaults::rpc_url(),
            contract_id: std::env::var("CONJURER_CONTRACT_ID")
                .ok()
                .filter(|id| !id.is_empty()),
            keys_path: defaults::keys_path(),
            gas_tgas: defaults::gas_tgas(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

mod defaults {
    pub fn bind_address() -> String {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
        format!("0.0.0.0:{port}")
    }

    pub fn openai_api_url() -> String {
        std::env::var("OPENAI_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".into())
    }

    pub fn openai_model() -> String {
        std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into())
    }

    pub fn rpc_url() -> String {
        if let Ok(url) = std::env::var("CONJURER_RPC_URL") {
            if !url.is_empty() {
                return url;
            }
        }
        let net = std::env::var("NEAR_NETWORK").unwrap_or_else(|_| "testnet".into());
        if net.contains("mainnet") {
            "https://free.rpc.fastnear.com".into()
        } else {
            "https://test.rpc.fastnear.com".into()
        }
    }

    pub fn keys_path() -> String {
        std::env::var("CONJURER_KEYS_PATH")
            .unwrap_or_else(|_| "./account_keys/owner.json".into())
    }

    pub fn gas_tgas() -> u64 {
        std::env::var("CONJURER_GAS_TGAS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_defaults_to_gpt_4o_mini() {
        if std::env::var("OPENAI_MODEL").is_err() {
            assert_eq!(defaults::openai_model(), "gpt-4o-mini");
        }
    }

    #[test]
    fn gate_disabled_without_contract() {
        if std::env::var("CONJURER_CONTRACT_ID").is_err() {
            assert!(Config::from_env().contract_id.is_none());
        }
    }
}
