//! Credit gate: on-chain balance reads and owner-signed debits.
//!
//! The check and the debit are two independent transactions around the
//! model call; the sequence is deliberately not atomic (a crash between
//! the model call and the debit grants a free generation).

use crate::Error;
use async_trait::async_trait;
use conjurer_chain::{keys, RpcClient};
use near_gas::NearGas;
use near_primitives::types::AccountId;
use serde_json::json;
use tracing::info;

/// Seam between the HTTP handlers and the credit ledger contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Current credit balance of an account.
    async fn get_credits(&self, account_id: &AccountId) -> Result<u64, Error>;

    /// Owner-signed debit. Returns the transaction hash.
    async fn decrease_credits(&self, account_id: &AccountId, amount: u64) -> Result<String, Error>;
}

/// Ledger backed by the deployed conjurer-credits contract.
pub struct ChainLedger {
    rpc: RpcClient,
    signer: near_crypto::Signer,
    contract_id: AccountId,
    gas: NearGas,
}

impl ChainLedger {
    pub fn new(
        rpc_url: &str,
        contract_id: &str,
        keys_path: &str,
        gas_tgas: u64,
    ) -> Result<Self, Error> {
        let contract_id: AccountId = contract_id
            .parse()
            .map_err(|e| Error::Config(format!("Invalid contract id: {e}")))?;

        // Owner key: OWNER_KEYS_JSON env var first, then the key file.
        let signer = keys::load_signer("OWNER_KEYS_JSON", keys_path)
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            rpc: RpcClient::new(rpc_url),
            signer,
            contract_id,
            gas: NearGas::from_tgas(gas_tgas),
        })
    }

    pub fn contract_id(&self) -> &AccountId {
        &self.contract_id
    }
}

#[async_trait]
impl CreditLedger for ChainLedger {
    async fn get_credits(&self, account_id: &AccountId) -> Result<u64, Error> {
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

    async fn decrease_credits(&self, account_id: &AccountId, amount: u64) -> Result<String, Error> {
        let outcome = self
            .rpc
            .call(
                &self.signer,
                &self.contract_id,
                "decrease_credits",
                json!({ "account_id": account_id, "amount": amount }),
                self.gas,
                0,
            )
            .await?;

        let tx_hash = outcome.transaction_outcome.id.to_string();
        info!(account = %account_id, amount, tx_hash = %tx_hash, "Credits debited");
        Ok(tx_hash)
    }
}
