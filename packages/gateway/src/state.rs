//! Application state shared across handlers.

use crate::config::Config;
use crate::ledger::{ChainLedger, CreditLedger};
use crate::vision::{FilenameGenerator, VisionClient};
use std::sync::Arc;
use tracing::info;

/// Shared application state. Built once at startup; read-only afterwards.
pub struct AppState {
    pub config: Config,
    pub vision: Arc<dyn FilenameGenerator>,
    /// Present only when a credit ledger contract is configured.
    pub ledger: Option<Arc<dyn CreditLedger>>,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        let vision = Arc::new(VisionClient::new(
            config.openai_api_url.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        ));

        let ledger: Option<Arc<dyn CreditLedger>> = match &config.contract_id {
            Some(contract_id) => {
                let ledger = ChainLedger::new(
                    &config.rpc_url,
                    contract_id,
                    &config.keys_path,
                    config.gas_tgas,
                )?;
                info!(contract = %ledger.contract_id(), "Credit gate enabled");
                Some(Arc::new(ledger))
            }
            None => {
                info!("No contract configured, credit gate disabled");
                None
            }
        };

        Ok(Self {
            config,
            vision,
            ledger,
        })
    }
}
