use soroban_sdk::{
    contracttype, symbol_short, Address, BytesN, Env, IntoVal, String, Symbol, Val, Vec,
};

use crate::error::BrokerError;

/// Storage keys for the contract.
///
/// Configuration lives in instance storage; everything keyed by a handle,
/// a requester or a manager lives in persistent storage.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Admin address (grants and revokes managers)
    Admin,
    /// Oracle transport contract that dispatches requests and delivers results
    Transport,
    /// Payment token contract the service fee is charged in
    Token,
    /// Service fee charged per request, in token base units
    Fee,
    /// Handle of the most recent fulfillment
    LastRequestId,
    /// Manager flag: Manager(address)
    Manager(Address),
    /// Dispatch record for a handle
    Request(BytesN<32>),
    /// Parameter echo (names, values) for a handle
    Params(BytesN<32>),
    /// Number of handles a requester has dispatched
    HistoryLen(Address),
    /// Handle a requester dispatched at a position: History(requester, index)
    History(Address, u32),
    TextResult(BytesN<32>),
    UintResult(BytesN<32>),
    BoolResult(BytesN<32>),
    BalanceResult(BytesN<32>),
}

/// Kind of value a request asks the oracle network to compute.
///
/// Fixed at dispatch; selects both the callback entry point and the
/// result slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[contracttype]
#[repr(u32)]
pub enum RequestType {
    Text = 0,
    Uint = 1,
    Bool = 2,
    AccountBalance = 3,
}

impl RequestType {
    pub fn from_u32(value: u32) -> Result<Self, BrokerError> {
        match value {
            0 => Ok(RequestType::Text),
            1 => Ok(RequestType::Uint),
            2 => Ok(RequestType::Bool),
            3 => Ok(RequestType::AccountBalance),
            _ => Err(BrokerError::UnsupportedRequestType),
        }
    }

    /// Name of the broker entry point the transport calls back.
    pub fn callback_fn(&self, env: &Env) -> Symbol {
        let name = match self {
            RequestType::Text => "fulfill_string",
            RequestType::Uint => "fulfill_uint",
            RequestType::Bool => "fulfill_bool",
            RequestType::AccountBalance => "fulfill_balance",
        };
        Symbol::new(env, name)
    }

    /// Second event topic for notifications about this kind.
    pub fn topic(&self) -> Symbol {
        match self {
            RequestType::Text => symbol_short!("string"),
            RequestType::Uint => symbol_short!("uint"),
            RequestType::Bool => symbol_short!("bool"),
            RequestType::AccountBalance => symbol_short!("balance"),
        }
    }

    fn result_key(&self, handle: BytesN<32>) -> DataKey {
        match self {
            RequestType::Text => DataKey::TextResult(handle),
            RequestType::Uint => DataKey::UintResult(handle),
            RequestType::Bool => DataKey::BoolResult(handle),
            RequestType::AccountBalance => DataKey::BalanceResult(handle),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[contracttype]
#[repr(u32)]
pub enum RequestStatus {
    Pending = 0,
    Fulfilled = 1,
    Cancelled = 2,
}

/// What the broker remembers about a dispatched request.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct RequestRecord {
    pub requester: Address,
    pub request_type: RequestType,
    /// Oracle node the request was addressed to
    pub oracle: Address,
    /// Fee in force at dispatch
    pub payment: i128,
    /// Ledger timestamp after which the transport accepts a cancellation
    pub expires_at: u64,
    pub status: RequestStatus,
}

/// A decoded fulfillment value, tagged by request type.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum OracleValue {
    Text(String),
    Uint(u128),
    Bool(bool),
    Balance(u128),
}

/// Seconds after dispatch before a pending request may be cancelled.
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Ledgers per day at a 5 second close time.
pub const DAY_IN_LEDGERS: u32 = 17_280;

/// TTL given to every entry the broker writes.
pub const PERSISTENT_TTL_EXTEND_TO: u32 = 30 * DAY_IN_LEDGERS;

/// Remaining TTL below which a write bumps the entry.
pub const PERSISTENT_TTL_THRESHOLD: u32 = PERSISTENT_TTL_EXTEND_TO - DAY_IN_LEDGERS;

/// Largest page `history_page` returns.
pub const MAX_HISTORY_PAGE: u32 = 100;

fn write_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: IntoVal<Env, Val>,
{
    let store = env.storage().persistent();
    store.set(key, value);
    store.extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND_TO);
}

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND_TO);
}

// --- Configuration ---

pub fn has_admin(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn admin(env: &Env) -> Result<Address, BrokerError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(BrokerError::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn transport(env: &Env) -> Result<Address, BrokerError> {
    env.storage()
        .instance()
        .get(&DataKey::Transport)
        .ok_or(BrokerError::StorageCorrupted)
}

pub fn token(env: &Env) -> Result<Address, BrokerError> {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(BrokerError::StorageCorrupted)
}

pub fn fee(env: &Env) -> Result<i128, BrokerError> {
    env.storage()
        .instance()
        .get(&DataKey::Fee)
        .ok_or(BrokerError::StorageCorrupted)
}

pub fn set_fee(env: &Env, fee: i128) {
    env.storage().instance().set(&DataKey::Fee, &fee);
}

// --- Roles ---

pub fn is_manager(env: &Env, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Manager(account.clone()))
        .unwrap_or(false)
}

pub fn set_manager(env: &Env, account: &Address, enabled: bool) {
    let key = DataKey::Manager(account.clone());
    if enabled {
        write_persistent(env, &key, &true);
    } else {
        env.storage().persistent().remove(&key);
    }
}

// --- Requests ---

pub fn request(env: &Env, handle: &BytesN<32>) -> Option<RequestRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Request(handle.clone()))
}

pub fn set_request(env: &Env, handle: &BytesN<32>, record: &RequestRecord) {
    write_persistent(env, &DataKey::Request(handle.clone()), record);
}

pub fn params(env: &Env, handle: &BytesN<32>) -> (Vec<String>, Vec<String>) {
    env.storage()
        .persistent()
        .get(&DataKey::Params(handle.clone()))
        .unwrap_or_else(|| (Vec::new(env), Vec::new(env)))
}

pub fn set_params(env: &Env, handle: &BytesN<32>, names: &Vec<String>, values: &Vec<String>) {
    write_persistent(
        env,
        &DataKey::Params(handle.clone()),
        &(names.clone(), values.clone()),
    );
}

pub fn history_len(env: &Env, requester: &Address) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::HistoryLen(requester.clone()))
        .unwrap_or(0)
}

/// Handles `requester` dispatched from position `start`, at most `limit`
/// (capped at MAX_HISTORY_PAGE) of them, oldest first.
pub fn history_page(env: &Env, requester: &Address, start: u32, limit: u32) -> Vec<BytesN<32>> {
    let len = history_len(env, requester);
    let end = start
        .saturating_add(limit.min(MAX_HISTORY_PAGE))
        .min(len);

    let mut page = Vec::new(env);
    for index in start..end {
        if let Some(handle) = env
            .storage()
            .persistent()
            .get(&DataKey::History(requester.clone(), index))
        {
            page.push_back(handle);
        }
    }
    page
}

/// Append one handle; each entry gets its own key so a submit never
/// rewrites the requester's earlier history.
pub fn push_history(env: &Env, requester: &Address, handle: &BytesN<32>) {
    let index = history_len(env, requester);
    write_persistent(env, &DataKey::History(requester.clone(), index), handle);
    write_persistent(env, &DataKey::HistoryLen(requester.clone()), &(index + 1));
}

pub fn last_request_id(env: &Env) -> Option<BytesN<32>> {
    env.storage().instance().get(&DataKey::LastRequestId)
}

pub fn set_last_request_id(env: &Env, handle: &BytesN<32>) {
    env.storage().instance().set(&DataKey::LastRequestId, handle);
}

// --- Results ---

/// Store a fulfillment value in the slot of its request type.
pub fn set_result(env: &Env, handle: &BytesN<32>, value: &OracleValue) {
    match value {
        OracleValue::Text(text) => {
            write_persistent(env, &RequestType::Text.result_key(handle.clone()), text)
        }
        OracleValue::Uint(number) => {
            write_persistent(env, &RequestType::Uint.result_key(handle.clone()), number)
        }
        OracleValue::Bool(flag) => {
            write_persistent(env, &RequestType::Bool.result_key(handle.clone()), flag)
        }
        OracleValue::Balance(amount) => write_persistent(
            env,
            &RequestType::AccountBalance.result_key(handle.clone()),
            amount,
        ),
    }
}

/// Read a result, falling back to the type's zero value while unfulfilled.
pub fn result(env: &Env, request_type: RequestType, handle: &BytesN<32>) -> OracleValue {
    let store = env.storage().persistent();
    let key = request_type.result_key(handle.clone());
    match request_type {
        RequestType::Text => OracleValue::Text(
            store
                .get(&key)
                .unwrap_or_else(|| String::from_str(env, "")),
        ),
        RequestType::Uint => OracleValue::Uint(store.get(&key).unwrap_or(0)),
        RequestType::Bool => OracleValue::Bool(store.get(&key).unwrap_or(false)),
        RequestType::AccountBalance => OracleValue::Balance(store.get(&key).unwrap_or(0)),
    }
}
