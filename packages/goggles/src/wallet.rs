//! Wallet-side contract operations: purchase flow plus the owner
//! maintenance calls.

use anyhow::{anyhow, bail, Context, Result};
use conjurer_chain::{keys, RpcClient};
use near_gas::NearGas;
use near_primitives::types::AccountId;
use serde_json::json;
use tracing::info;

const YOCTO_PER_NEAR: u128 = 1_000_000_000_000_000_000_000_000;

pub struct Wallet {
    rpc: RpcClient,
    contract_id: AccountId,
    keys_path: String,
    gas: NearGas,
}

impl Wallet {
    pub fn new(rpc_url: &str, contract_id: &str, keys_path: &str) -> Result<Self> {
        let contract_id = contract_id
            .parse()
            .map_err(|e| anyhow!("Invalid contract id: {e}"))?;
        Ok(Self {
            rpc: RpcClient::new(rpc_url),
            contract_id,
            keys_path: keys_path.to_string(),
            gas: NearGas::from_tgas(100),
        })
    }

    fn signer(&self) -> Result<near_crypto::Signer> {
        keys::load_signer("GOGGLES_KEYS_JSON", &self.keys_path)
            .context("Failed to load signing key")
    }

    // --- Views ---

    pub async fn credits(&self, account_id: &str) -> Result<u64> {
        let account_id: AccountId = account_id
            .parse()
            .map_err(|e| anyhow!("Invalid account id: {e}"))?;
        let credits = self
            .rpc
            .view(
                &self.contract_id,
                "get_credits",
                json!({ "account_id": account_id }),
            )
            .await?;
        Ok(credits)
    }

    /// Current price in yoctoNEAR.
    pub async fn credit_price(&self) -> Result<u128> {
        let price: String = self
            .rpc
            .view(&self.contract_id, "credit_price", json!({}))
            .await?;
        price.parse().context("Contract returned a non-numeric price")
    }

    pub async fn contract_balance(&self) -> Result<u128> {
        let balance: String = self
            .rpc
            .view(&self.contract_id, "get_contract_balance", json!({}))
            .await?;
        balance
            .parse()
            .context("Contract returned a non-numeric balance")
    }

    // --- Transactions ---

    /// Buy credits with an attached deposit. Returns credits granted.
    pub async fn buy(&self, amount_near: &str) -> Result<u64> {
        let deposit = parse_near(amount_near)?;
        let signer = self.signer()?;

        let outcome = self
            .rpc
            .call(
                &signer,
                &self.contract_id,
                "buy_credits",
                json!({}),
                self.gas,
                deposit,
            )
            .await?;

        let granted: u64 = conjurer_chain::rpc::outcome_json(&outcome)
            .ok_or_else(|| anyhow!("Contract returned no credit count"))?;
        info!(
            account = %signer.get_account_id(),
            deposit = %amount_near,
            granted,
            "Credits purchased"
        );
        Ok(granted)
    }

    /// Owner-only: withdraw the accumulated pool.
    pub async fn withdraw(&self) -> Result<String> {
        let signer = self.signer()?;
        let outcome = self
            .rpc
            .call(
                &signer,
                &self.contract_id,
                "withdraw",
                json!({}),
                self.gas,
                0,
            )
            .await?;
        Ok(outcome.transaction_outcome.id.to_string())
    }

    /// Owner-only: reprice credits (amount in NEAR).
    pub async fn set_price(&self, amount_near: &str) -> Result<String> {
        let price = parse_near(amount_near)?;
        let signer = self.signer()?;
        let outcome = self
            .rpc
            .call(
                &signer,
                &self.contract_id,
                "set_credit_price",
                json!({ "amount": price.to_string() }),
                self.gas,
                0,
            )
            .await?;
        Ok(outcome.transaction_outcome.id.to_string())
    }
}

/// Parse a decimal NEAR amount ("0.0001") into yoctoNEAR.
pub fn parse_near(amount: &str) -> Result<u128> {
    let amount = amount.trim();
    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        bail!("Empty amount");
    }
    if frac.len() > 24 {
        bail!("Amounts below 1 yoctoNEAR are not representable");
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().with_context(|| format!("Invalid amount: {amount}"))?
    };

    let frac_yocto: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<24}");
        padded.parse().with_context(|| format!("Invalid amount: {amount}"))?
    };

    whole
        .checked_mul(YOCTO_PER_NEAR)
        .and_then(|w| w.checked_add(frac_yocto))
        .ok_or_else(|| anyhow!("Amount too large: {amount}"))
}

/// Render yoctoNEAR as a decimal NEAR string for display.
pub fn format_near(yocto: u128) -> String {
    let whole = yocto / YOCTO_PER_NEAR;
    let frac = yocto % YOCTO_PER_NEAR;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:024}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_near() {
        assert_eq!(parse_near("1").unwrap(), YOCTO_PER_NEAR);
        assert_eq!(parse_near("10").unwrap(), 10 * YOCTO_PER_NEAR);
    }

    #[test]
    fn parses_fractional_near() {
        assert_eq!(parse_near("0.0001").unwrap(), YOCTO_PER_NEAR / 10_000);
        assert_eq!(parse_near(".5").unwrap(), YOCTO_PER_NEAR / 2);
        assert_eq!(parse_near("1.5").unwrap(), 3 * YOCTO_PER_NEAR / 2);
    }

    #[test]
    fn rejects_garbage_amounts() {
        assert!(parse_near("").is_err());
        assert!(parse_near("abc").is_err());
        assert!(parse_near("1.2.3").is_err());
        assert!(parse_near("0.0000000000000000000000001").is_err());
    }

    #[test]
    fn formats_round_trip() {
        for amount in ["1", "0.0001", "12.5"] {
            assert_eq!(format_near(parse_near(amount).unwrap()), amount);
        }
    }
}
