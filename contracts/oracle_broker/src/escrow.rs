//! Service fee custody.
//!
//! Fees are pulled from the requester with an allowance (`transfer_from`)
//! before anything is dispatched, and sit in the broker's own token balance
//! until a manager withdraws them.

use soroban_sdk::{log, token, Address, Env};

use crate::error::BrokerError;
use crate::storage;

/// Pull `amount` of the payment token from `payer` into custody.
///
/// A zero amount is a no-op so fee-free deployments never touch the token.
pub fn collect_fee(env: &Env, payer: &Address, amount: i128) -> Result<(), BrokerError> {
    if amount == 0 {
        return Ok(());
    }

    let token_client = token::Client::new(env, &storage::token(env)?);
    let broker = env.current_contract_address();

    if token_client.allowance(payer, &broker) < amount {
        return Err(BrokerError::InsufficientAllowance);
    }

    match token_client.try_transfer_from(&broker, payer, &broker, &amount) {
        Ok(Ok(())) => {
            log!(env, "fee collected", payer.clone(), amount);
            Ok(())
        }
        _ => Err(BrokerError::TransferFailed),
    }
}

/// Token balance currently held by the broker.
pub fn custody_balance(env: &Env) -> Result<i128, BrokerError> {
    let token_client = token::Client::new(env, &storage::token(env)?);
    Ok(token_client.balance(&env.current_contract_address()))
}

/// Move the whole custody balance to `to`, returning the amount moved.
pub fn withdraw_all(env: &Env, to: &Address) -> Result<i128, BrokerError> {
    let token_client = token::Client::new(env, &storage::token(env)?);
    let broker = env.current_contract_address();

    let balance = token_client.balance(&broker);
    if balance <= 0 {
        return Err(BrokerError::NothingToWithdraw);
    }

    match token_client.try_transfer(&broker, to, &balance) {
        Ok(Ok(())) => Ok(balance),
        _ => Err(BrokerError::TransferFailed),
    }
}
