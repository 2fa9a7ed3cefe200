//! JSON-RPC access: view calls and locally signed function calls.
//!
//! One endpoint, one attempt per call. Failover and retry are intentionally
//! absent; the gateway surfaces RPC failures to the caller instead.

use crate::Error;
use near_crypto::Signer;
use near_gas::NearGas;
use near_jsonrpc_client::{methods, JsonRpcClient};
use near_primitives::hash::CryptoHash;
use near_primitives::transaction::{
    Action, FunctionCallAction, Transaction, TransactionV0,
};
use near_primitives::types::{AccountId, BlockReference, Finality, FunctionArgs};
use near_primitives::views::{FinalExecutionOutcomeView, FinalExecutionStatus, QueryRequest};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

/// Thin JSON-RPC client bound to a single endpoint.
pub struct RpcClient {
    client: JsonRpcClient,
    url: String,
}

impl RpcClient {
    pub fn new(url: &str) -> Self {
        info!(rpc = url, "RPC client initialized");
        Self {
            client: JsonRpcClient::connect(url),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call a view method and deserialize its JSON result.
    pub async fn view<T: DeserializeOwned>(
        &self,
        contract_id: &AccountId,
        method: &str,
        args: Value,
    ) -> Result<T, Error> {
        let args_bytes = serde_json::to_vec(&args)
            .map_err(|e| Error::Rpc(format!("args serialization failed: {e}")))?;

        let resp = self
            .client
            .call(methods::query::RpcQueryRequest {
                block_reference: BlockReference::Finality(Finality::Final),
                request: QueryRequest::CallFunction {
                    account_id: contract_id.clone(),
                    method_name: method.to_string(),
                    args: FunctionArgs::from(args_bytes),
                },
            })
            .await
            .map_err(|e| Error::Rpc(format!("view {method} failed: {e}")))?;

        match resp.kind {
            near_jsonrpc_primitives::types::query::QueryResponseKind::CallResult(result) => {
                serde_json::from_slice(&result.result)
                    .map_err(|e| Error::Rpc(format!("view {method} returned invalid JSON: {e}")))
            }
            other => Err(Error::Rpc(format!("unexpected query response: {other:?}"))),
        }
    }

    /// Sign and submit a function call, waiting for finality. Returns an
    /// error if the transaction or any receipt failed on-chain.
    pub async fn call(
        &self,
        signer: &Signer,
        contract_id: &AccountId,
        method: &str,
        args: Value,
        gas: NearGas,
        deposit: u128,
    ) -> Result<FinalExecutionOutcomeView, Error> {
        let signer_id = signer.get_account_id();
        let public_key = signer.public_key();

        let nonce = self.access_key_nonce(&signer_id, &public_key).await? + 1;
        let block_hash = self.latest_block_hash().await?;

        let args_bytes = serde_json::to_vec(&args)
            .map_err(|e| Error::Rpc(format!("args serialization failed: {e}")))?;

        let signed_tx = Transaction::V0(TransactionV0 {
            signer_id,
            public_key,
            nonce,
            receiver_id: contract_id.clone(),
            block_hash,
            actions: vec![Action::FunctionCall(Box::new(FunctionCallAction {
                method_name: method.to_string(),
                args: args_bytes,
                gas: gas.as_gas(),
                deposit,
            }))],
        })
        .sign(signer);

        debug!(method, contract = %contract_id, nonce, "Broadcasting transaction");

        let outcome = self
            .client
            .call(methods::broadcast_tx_commit::RpcBroadcastTxCommitRequest {
                signed_transaction: signed_tx,
            })
            .await
            .map_err(|e| Error::Rpc(format!("broadcast_tx_commit failed: {e}")))?;

        require_success(&outcome)?;
        Ok(outcome)
    }

    /// Quick connectivity probe: fetch the final block.
    pub async fn health_check(&self) -> Result<(), Error> {
        self.client
            .call(methods::block::RpcBlockRequest {
                block_reference: BlockReference::Finality(Finality::Final),
            })
            .await
            .map(|_| ())
            .map_err(|e| Error::Rpc(format!("RPC unreachable: {e}")))
    }

    async fn latest_block_hash(&self) -> Result<CryptoHash, Error> {
        let block = self
            .client
            .call(methods::block::RpcBlockRequest {
                block_reference: BlockReference::Finality(Finality::Final),
            })
            .await
            .map_err(|e| Error::Rpc(format!("block query failed: {e}")))?;
        Ok(block.header.hash)
    }

    async fn access_key_nonce(
        &self,
        account_id: &AccountId,
        public_key: &near_crypto::PublicKey,
    ) -> Result<u64, Error> {
        let resp = self
            .client
            .call(methods::query::RpcQueryRequest {
                block_reference: BlockReference::Finality(Finality::Final),
                request: QueryRequest::ViewAccessKey {
                    account_id: account_id.clone(),
                    public_key: public_key.clone(),
                },
            })
            .await
            .map_err(|e| Error::Rpc(format!("access_key query failed: {e}")))?;

        match resp.kind {
            near_jsonrpc_primitives::types::query::QueryResponseKind::AccessKey(ak) => Ok(ak.nonce),
            other => Err(Error::Rpc(format!("unexpected query response: {other:?}"))),
        }
    }
}

/// Map an on-chain execution failure to an error with the revert reason.
pub fn require_success(outcome: &FinalExecutionOutcomeView) -> Result<(), Error> {
    match &outcome.status {
        FinalExecutionStatus::SuccessValue(_) => Ok(()),
        FinalExecutionStatus::Failure(err) => Err(Error::Execution(format!("{err:?}"))),
        other => Err(Error::Rpc(format!("transaction not finalized: {other:?}"))),
    }
}

/// Deserialize the JSON return value of a successful call, if any.
pub fn outcome_json<T: DeserializeOwned>(outcome: &FinalExecutionOutcomeView) -> Option<T> {
    match &outcome.status {
        FinalExecutionStatus::SuccessValue(bytes) => serde_json::from_slice(bytes).ok(),
        _ => None,
    }
}
