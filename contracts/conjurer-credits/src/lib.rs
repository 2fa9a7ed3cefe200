//! Credit ledger for the Conjurer filename service.
//!
//! Users buy credits with native tokens; each credit entitles the bearer to
//! one filename generation. The gateway owner debits credits after serving a
//! request and may withdraw accumulated funds or reprice credits.

use near_sdk::{
    AccountId, BorshStorageKey, NearToken, Promise, env, json_types::U128, near, require,
    serde_json, store::LookupMap,
};

const EVENT_STANDARD: &str = "conjurer";
const EVENT_VERSION: &str = "1.0.0";
const EVENT_JSON_PREFIX: &str = "EVENT_JSON:";

const EVENT_CREDITS_PURCHASE: &str = "CREDITS_PURCHASE";
const EVENT_CREDITS_DEBIT: &str = "CREDITS_DEBIT";
const EVENT_PRICE_UPDATED: &str = "PRICE_UPDATED";
const EVENT_WITHDRAW: &str = "WITHDRAW";

const ERR_ONLY_OWNER: &str = "Only owner can call this function";
const ERR_ZERO_AMOUNT: &str = "Amount must be greater than 0";

#[derive(BorshStorageKey)]
#[near]
enum StorageKey {
    Credits,
}

#[near(contract_state)]
pub struct ConjurerCredits {
    owner_id: AccountId,
    /// yoctoNEAR per credit. Always positive.
    credit_price: u128,
    credits: LookupMap<AccountId, u64>,
    /// Purchase deposits not yet withdrawn by the owner.
    pool: u128,
}

impl Default for ConjurerCredits {
    fn default() -> Self {
        env::panic_str("Contract must be initialized")
    }
}

#[near]
impl ConjurerCredits {
    #[init]
    pub fn new(owner_id: AccountId, credit_price: U128) -> Self {
        require!(credit_price.0 > 0, ERR_ZERO_AMOUNT);
        Self {
            owner_id,
            credit_price: credit_price.0,
            credits: LookupMap::new(StorageKey::Credits),
            pool: 0,
        }
    }

    // --- User ---

    /// Buys whole credits at `credit_price` per credit. The fractional
    /// remainder of the deposit is forfeited into the pool.
    #[payable]
    pub fn buy_credits(&mut self) -> u64 {
        let buyer = env::predecessor_account_id();
        let deposit = env::attached_deposit().as_yoctonear();
        require!(deposit > 0, ERR_ZERO_AMOUNT);

        let granted = deposit / self.credit_price;
        require!(granted > 0, "Insufficient payment for credits");
        let granted = u64::try_from(granted)
            .unwrap_or_else(|_| env::panic_str("Credit amount overflow"));

        let balance = self.credits.get(&buyer).copied().unwrap_or(0);
        self.credits.insert(buyer.clone(), balance + granted);
        self.pool += deposit;

        Self::emit_event(
            EVENT_CREDITS_PURCHASE,
            &buyer,
            serde_json::json!({
                "deposit": deposit.to_string(),
                "credits": granted
            }),
        );

        granted
    }

    // --- Owner ---

    /// Debits credits from a user after a served generation. Fails closed if
    /// the amount exceeds the balance.
    pub fn decrease_credits(&mut self, account_id: AccountId, amount: u64) {
        self.assert_owner();
        require!(amount > 0, ERR_ZERO_AMOUNT);

        let balance = self.credits.get(&account_id).copied().unwrap_or(0);
        require!(amount <= balance, "Insufficient credits");

        self.credits.insert(account_id.clone(), balance - amount);

        Self::emit_event(
            EVENT_CREDITS_DEBIT,
            &account_id,
            serde_json::json!({
                "amount": amount
            }),
        );
    }

    /// Transfers the entire pool to the owner and zeroes it.
    pub fn withdraw(&mut self) -> Promise {
        self.assert_owner();
        require!(self.pool > 0, "No funds to withdraw");

        let amount = self.pool;
        self.pool = 0;

        Self::emit_event(
            EVENT_WITHDRAW,
            &self.owner_id.clone(),
            serde_json::json!({
                "amount": amount.to_string()
            }),
        );

        Promise::new(self.owner_id.clone()).transfer(NearToken::from_yoctonear(amount))
    }

    pub fn set_credit_price(&mut self, amount: U128) {
        self.assert_owner();
        require!(amount.0 > 0, ERR_ZERO_AMOUNT);

        let old_price = self.credit_price;
        self.credit_price = amount.0;

        Self::emit_event(
            EVENT_PRICE_UPDATED,
            &self.owner_id.clone(),
            serde_json::json!({
                "old_price": old_price.to_string(),
                "new_price": amount.0.to_string()
            }),
        );
    }

    // --- View ---

    pub fn owner(&self) -> AccountId {
        self.owner_id.clone()
    }

    pub fn credit_price(&self) -> U128 {
        U128(self.credit_price)
    }

    pub fn get_credits(&self, account_id: AccountId) -> u64 {
        self.credits.get(&account_id).copied().unwrap_or(0)
    }

    /// ABI-parity alias for `get_credits`.
    pub fn user_credits(&self, account_id: AccountId) -> u64 {
        self.get_credits(account_id)
    }

    pub fn get_contract_balance(&self) -> U128 {
        U128(self.pool)
    }

    // --- Internal ---

    fn assert_owner(&self) {
        require!(
            env::predecessor_account_id() == self.owner_id,
            ERR_ONLY_OWNER
        );
    }

    fn emit_event(event_type: &str, account_id: &AccountId, data: serde_json::Value) {
        let event = serde_json::json!({
            "standard": EVENT_STANDARD,
            "version": EVENT_VERSION,
            "event": event_type,
            "data": [{
                "account_id": account_id.to_string(),
                "extra": data
            }]
        });
        env::log_str(&format!("{EVENT_JSON_PREFIX}{}", event));
    }
}

#[cfg(test)]
mod tests;
