use super::*;
use near_sdk::test_utils::VMContextBuilder;
use near_sdk::testing_env;

/// 0.0001 NEAR per credit, the deployment default.
const CREDIT_PRICE: u128 = 100_000_000_000_000_000_000;

// --- Test Helpers ---

fn get_context(predecessor: AccountId) -> VMContextBuilder {
    let mut builder = VMContextBuilder::new();
    builder.predecessor_account_id(predecessor);
    builder
}

fn setup_contract() -> ConjurerCredits {
    let context = get_context("owner.near".parse().unwrap());
    testing_env!(context.build());

    ConjurerCredits::new("owner.near".parse().unwrap(), U128(CREDIT_PRICE))
}

fn buy_as(contract: &mut ConjurerCredits, buyer: &str, deposit: u128) -> u64 {
    let mut context = get_context(buyer.parse().unwrap());
    context.attached_deposit(NearToken::from_yoctonear(deposit));
    testing_env!(context.build());
    contract.buy_credits()
}

fn as_owner(contract: &ConjurerCredits) {
    let context = get_context(contract.owner_id.clone());
    testing_env!(context.build());
}

// --- Initialization Tests ---

#[test]
fn test_init() {
    let contract = setup_contract();

    assert_eq!(contract.owner().as_str(), "owner.near");
    assert_eq!(contract.credit_price().0, CREDIT_PRICE);
    assert_eq!(contract.get_contract_balance().0, 0);
}

#[test]
#[should_panic(expected = "Amount must be greater than 0")]
fn test_init_rejects_zero_price() {
    let context = get_context("owner.near".parse().unwrap());
    testing_env!(context.build());

    ConjurerCredits::new("owner.near".parse().unwrap(), U128(0));
}

// --- Credit Purchase Tests ---

#[test]
fn test_buy_credits_floor_division() {
    let mut contract = setup_contract();

    // 10x the price buys exactly 10 credits.
    let granted = buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);
    assert_eq!(granted, 10);
    assert_eq!(contract.get_credits("alice.near".parse().unwrap()), 10);

    // Remainder is forfeited: 2.5x the price buys 2 credits and the full
    // deposit still lands in the pool.
    let granted = buy_as(&mut contract, "bob.near", 5 * CREDIT_PRICE / 2);
    assert_eq!(granted, 2);
    assert_eq!(contract.get_credits("bob.near".parse().unwrap()), 2);
    assert_eq!(
        contract.get_contract_balance().0,
        10 * CREDIT_PRICE + 5 * CREDIT_PRICE / 2
    );
}

#[test]
fn test_buy_credits_accumulates() {
    let mut contract = setup_contract();

    buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);
    buy_as(&mut contract, "alice.near", 5 * CREDIT_PRICE);

    assert_eq!(contract.get_credits("alice.near".parse().unwrap()), 15);
}

#[test]
#[should_panic(expected = "Insufficient payment for credits")]
fn test_buy_credits_rejects_sub_price_payment() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", CREDIT_PRICE / 2);
}

#[test]
#[should_panic(expected = "Amount must be greater than 0")]
fn test_buy_credits_rejects_zero_payment() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", 0);
}

#[test]
fn test_buy_credits_after_reprice() {
    let mut contract = setup_contract();

    as_owner(&contract);
    contract.set_credit_price(U128(2 * CREDIT_PRICE));

    let granted = buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);
    assert_eq!(granted, 5);
}

// --- Credit Management Tests ---

#[test]
fn test_decrease_credits() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);

    as_owner(&contract);
    contract.decrease_credits("alice.near".parse().unwrap(), 4);

    assert_eq!(contract.get_credits("alice.near".parse().unwrap()), 6);
}

#[test]
fn test_decrease_credits_to_zero() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", 3 * CREDIT_PRICE);

    as_owner(&contract);
    contract.decrease_credits("alice.near".parse().unwrap(), 3);

    assert_eq!(contract.get_credits("alice.near".parse().unwrap()), 0);
}

#[test]
#[should_panic(expected = "Insufficient credits")]
fn test_decrease_credits_rejects_overdraft() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);

    as_owner(&contract);
    contract.decrease_credits("alice.near".parse().unwrap(), 11);
}

#[test]
#[should_panic(expected = "Insufficient credits")]
fn test_decrease_credits_rejects_unknown_account() {
    let mut contract = setup_contract();

    as_owner(&contract);
    contract.decrease_credits("nobody.near".parse().unwrap(), 1);
}

#[test]
#[should_panic(expected = "Amount must be greater than 0")]
fn test_decrease_credits_rejects_zero_amount() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);

    as_owner(&contract);
    contract.decrease_credits("alice.near".parse().unwrap(), 0);
}

#[test]
#[should_panic(expected = "Only owner can call this function")]
fn test_decrease_credits_rejects_non_owner() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);

    let context = get_context("alice.near".parse().unwrap());
    testing_env!(context.build());
    contract.decrease_credits("alice.near".parse().unwrap(), 1);
}

// --- Withdrawal Tests ---

#[test]
fn test_withdraw_zeroes_pool() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);

    assert_eq!(contract.get_contract_balance().0, 10 * CREDIT_PRICE);

    as_owner(&contract);
    contract.withdraw();

    assert_eq!(contract.get_contract_balance().0, 0);
}

#[test]
#[should_panic(expected = "No funds to withdraw")]
fn test_withdraw_rejects_empty_pool() {
    let mut contract = setup_contract();

    as_owner(&contract);
    contract.withdraw();
}

#[test]
#[should_panic(expected = "Only owner can call this function")]
fn test_withdraw_rejects_non_owner() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);

    let context = get_context("alice.near".parse().unwrap());
    testing_env!(context.build());
    contract.withdraw();
}

// --- Price Management Tests ---

#[test]
fn test_set_credit_price() {
    let mut contract = setup_contract();

    as_owner(&contract);
    contract.set_credit_price(U128(2 * CREDIT_PRICE));

    assert_eq!(contract.credit_price().0, 2 * CREDIT_PRICE);
}

#[test]
#[should_panic(expected = "Amount must be greater than 0")]
fn test_set_credit_price_rejects_zero() {
    let mut contract = setup_contract();

    as_owner(&contract);
    contract.set_credit_price(U128(0));
}

#[test]
#[should_panic(expected = "Only owner can call this function")]
fn test_set_credit_price_rejects_non_owner() {
    let mut contract = setup_contract();

    let context = get_context("alice.near".parse().unwrap());
    testing_env!(context.build());
    contract.set_credit_price(U128(CREDIT_PRICE));
}

// --- View Tests ---

#[test]
fn test_get_credits_default_zero() {
    let contract = setup_contract();
    assert_eq!(contract.get_credits("nobody.near".parse().unwrap()), 0);
}

#[test]
fn test_user_credits_alias() {
    let mut contract = setup_contract();
    buy_as(&mut contract, "alice.near", 7 * CREDIT_PRICE);

    let account: AccountId = "alice.near".parse().unwrap();
    assert_eq!(
        contract.user_credits(account.clone()),
        contract.get_credits(account)
    );
}

#[test]
fn test_multiple_users_independent() {
    let mut contract = setup_contract();

    buy_as(&mut contract, "alice.near", 10 * CREDIT_PRICE);
    buy_as(&mut contract, "bob.near", 3 * CREDIT_PRICE);

    as_owner(&contract);
    contract.decrease_credits("alice.near".parse().unwrap(), 5);

    assert_eq!(contract.get_credits("alice.near".parse().unwrap()), 5);
    assert_eq!(contract.get_credits("bob.near".parse().unwrap()), 3);
}
