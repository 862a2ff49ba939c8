use soroban_sdk::{Address, Env};

use crate::error::BrokerError;
use crate::storage;

/// Admin passes every manager check.
pub fn has_manager_role(env: &Env, account: &Address) -> Result<bool, BrokerError> {
    let admin = storage::admin(env)?;
    Ok(*account == admin || storage::is_manager(env, account))
}

/// Verify `caller` is the admin and has authorized the call.
pub fn require_admin(env: &Env, caller: &Address) -> Result<(), BrokerError> {
    let admin = storage::admin(env)?;
    if *caller != admin {
        return Err(BrokerError::Unauthorized);
    }
    caller.require_auth();
    Ok(())
}

/// Verify `caller` holds the manager role (or is admin) and has authorized the call.
pub fn require_manager(env: &Env, caller: &Address) -> Result<(), BrokerError> {
    if !has_manager_role(env, caller)? {
        return Err(BrokerError::Unauthorized);
    }
    caller.require_auth();
    Ok(())
}
