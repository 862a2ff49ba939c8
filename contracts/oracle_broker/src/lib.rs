#![no_std]

mod access;
mod error;
mod escrow;
mod job_id;
mod storage;
mod transport;

pub use error::BrokerError;
pub use storage::{OracleValue, RequestRecord, RequestStatus, RequestType};
pub use transport::{OracleRequest, OracleTransportClient, RequestParam};

use soroban_sdk::{contract, contractimpl, log, symbol_short, Address, BytesN, Env, String, Vec};
use storage::REQUEST_TIMEOUT_SECS;

/// Oracle Request Broker Contract
///
/// Lets any account ask an off-chain oracle network for a string, integer,
/// boolean or account-balance value computed from named parameters, and
/// later read the result delivered through a callback.
///
/// Key features:
/// - Requesters pay a configurable service fee before a request is dispatched
/// - Every handle is recorded with its request type and fulfilled at most once
/// - Results, parameter echoes and per-requester history are kept for polling
/// - Admin grants managers; managers set the fee, withdraw fees and cancel requests
#[contract]
pub struct OracleBroker;

#[contractimpl]
impl OracleBroker {
    /// Constructor: called automatically on deployment.
    ///
    /// Delegates to initialize() for the actual setup logic.
    pub fn __constructor(env: Env, admin: Address, transport: Address, token: Address, fee: i128) {
        Self::initialize(env, admin, transport, token, fee).expect("initialization failed");
    }

    /// Initialize the broker.
    ///
    /// # Arguments
    /// * `admin` - Address that manages roles (and passes every manager check)
    /// * `transport` - Oracle transport contract that dispatches and fulfills requests
    /// * `token` - Token contract the service fee is paid in
    /// * `fee` - Service fee per request in token base units (0 disables charging)
    pub fn initialize(
        env: Env,
        admin: Address,
        transport: Address,
        token: Address,
        fee: i128,
    ) -> Result<(), BrokerError> {
        if storage::has_admin(&env) {
            return Err(BrokerError::AlreadyInitialized);
        }
        if fee < 0 {
            return Err(BrokerError::InvalidAmount);
        }

        admin.require_auth();

        storage::set_admin(&env, &admin);
        env.storage()
            .instance()
            .set(&storage::DataKey::Transport, &transport);
        env.storage().instance().set(&storage::DataKey::Token, &token);
        storage::set_fee(&env, fee);

        Ok(())
    }

    /// Submit a request to the oracle network.
    ///
    /// # Arguments
    /// * `requester` - Account paying the fee (must authorize)
    /// * `oracle` - Oracle node the transport should route the request to
    /// * `job_id` - Human-readable job id, encoded to the 32-byte transport key
    /// * `request_type` - 0 string, 1 uint, 2 bool, 3 account balance
    /// * `param_names` / `param_values` - Request parameters, sent in this order
    ///
    /// # Returns
    /// Handle minted by the transport, used to read the result later
    pub fn submit(
        env: Env,
        requester: Address,
        oracle: Address,
        job_id: String,
        request_type: u32,
        param_names: Vec<String>,
        param_values: Vec<String>,
    ) -> Result<BytesN<32>, BrokerError> {
        Self::require_initialized(&env)?;

        if param_names.len() != param_values.len() {
            return Err(BrokerError::ParameterMismatch);
        }
        let request_type = RequestType::from_u32(request_type)?;

        Self::dispatch(
            &env,
            requester,
            oracle,
            job_id,
            request_type,
            param_names,
            param_values,
        )
    }

    /// Ask for the balance of `account`, fulfilled through `fulfill_balance`.
    pub fn request_account_balance(
        env: Env,
        requester: Address,
        oracle: Address,
        job_id: String,
        account: String,
    ) -> Result<BytesN<32>, BrokerError> {
        Self::require_initialized(&env)?;

        let names = Vec::from_array(&env, [String::from_str(&env, "account")]);
        let values = Vec::from_array(&env, [account]);

        Self::dispatch(
            &env,
            requester,
            oracle,
            job_id,
            RequestType::AccountBalance,
            names,
            values,
        )
    }

    // --- Fulfillment entry points (transport only) ---

    pub fn fulfill_string(env: Env, handle: BytesN<32>, value: String) -> Result<(), BrokerError> {
        Self::accept_fulfillment(&env, &handle, RequestType::Text)?;
        storage::set_result(&env, &handle, &OracleValue::Text(value.clone()));
        env.events().publish(
            (symbol_short!("fulfilled"), RequestType::Text.topic()),
            (handle, value),
        );
        Ok(())
    }

    pub fn fulfill_uint(env: Env, handle: BytesN<32>, value: u128) -> Result<(), BrokerError> {
        Self::accept_fulfillment(&env, &handle, RequestType::Uint)?;
        storage::set_result(&env, &handle, &OracleValue::Uint(value));
        env.events().publish(
            (symbol_short!("fulfilled"), RequestType::Uint.topic()),
            (handle, value),
        );
        Ok(())
    }

    pub fn fulfill_bool(env: Env, handle: BytesN<32>, value: bool) -> Result<(), BrokerError> {
        Self::accept_fulfillment(&env, &handle, RequestType::Bool)?;
        storage::set_result(&env, &handle, &OracleValue::Bool(value));
        env.events().publish(
            (symbol_short!("fulfilled"), RequestType::Bool.topic()),
            (handle, value),
        );
        Ok(())
    }

    pub fn fulfill_balance(env: Env, handle: BytesN<32>, value: u128) -> Result<(), BrokerError> {
        Self::accept_fulfillment(&env, &handle, RequestType::AccountBalance)?;
        storage::set_result(&env, &handle, &OracleValue::Balance(value));
        env.events().publish(
            (symbol_short!("fulfilled"), RequestType::AccountBalance.topic()),
            (handle, value),
        );
        Ok(())
    }

    // --- Administration ---

    /// Cancel a pending request through the transport (manager only).
    ///
    /// The transport decides whether the request has expired and refunds
    /// whatever it can; the broker only forwards what it recorded at dispatch.
    pub fn cancel_request(env: Env, caller: Address, handle: BytesN<32>) -> Result<(), BrokerError> {
        Self::require_initialized(&env)?;
        access::require_manager(&env, &caller)?;

        let mut record = storage::request(&env, &handle).ok_or(BrokerError::UnknownRequest)?;
        if record.status != RequestStatus::Pending {
            return Err(BrokerError::RequestNotPending);
        }

        let transport = OracleTransportClient::new(&env, &storage::transport(&env)?);
        transport.cancel(
            &handle,
            &record.payment,
            &record.request_type.callback_fn(&env),
            &record.expires_at,
        );

        record.status = RequestStatus::Cancelled;
        storage::set_request(&env, &handle, &record);

        log!(&env, "request cancelled", handle);
        env.events().publish((symbol_short!("cancelled"),), handle);

        Ok(())
    }

    /// Set the service fee for future requests (manager only).
    pub fn set_fee(env: Env, caller: Address, fee: i128) -> Result<(), BrokerError> {
        Self::require_initialized(&env)?;
        access::require_manager(&env, &caller)?;

        if fee < 0 {
            return Err(BrokerError::InvalidAmount);
        }

        storage::set_fee(&env, fee);
        env.events().publish((symbol_short!("fee_set"),), fee);

        Ok(())
    }

    /// Withdraw all collected fees to `to` (manager only).
    ///
    /// # Returns
    /// Amount of the payment token withdrawn
    pub fn withdraw(env: Env, caller: Address, to: Address) -> Result<i128, BrokerError> {
        Self::require_initialized(&env)?;
        access::require_manager(&env, &caller)?;

        let amount = escrow::withdraw_all(&env, &to)?;

        log!(&env, "custody withdrawn", to, amount);
        env.events().publish((symbol_short!("withdrawn"),), (to, amount));

        Ok(amount)
    }

    /// Grant the manager role (admin only).
    pub fn grant_manager(env: Env, admin: Address, manager: Address) -> Result<(), BrokerError> {
        Self::require_initialized(&env)?;
        access::require_admin(&env, &admin)?;

        storage::set_manager(&env, &manager, true);

        log!(&env, "manager granted", manager);
        env.events().publish((symbol_short!("granted"),), manager);

        Ok(())
    }

    /// Revoke the manager role (admin only).
    pub fn revoke_manager(env: Env, admin: Address, manager: Address) -> Result<(), BrokerError> {
        Self::require_initialized(&env)?;
        access::require_admin(&env, &admin)?;

        storage::set_manager(&env, &manager, false);

        log!(&env, "manager revoked", manager);
        env.events().publish((symbol_short!("revoked"),), manager);

        Ok(())
    }

    /// Hand the admin role to another address (admin only).
    pub fn transfer_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), BrokerError> {
        Self::require_initialized(&env)?;
        access::require_admin(&env, &admin)?;

        storage::set_admin(&env, &new_admin);
        env.events().publish((symbol_short!("admin"),), new_admin);

        Ok(())
    }

    // --- Queries ---

    /// Get the result of a request.
    ///
    /// Returns the type's zero value ("", 0, false) until the request is
    /// fulfilled, indistinguishable from a genuine zero result.
    pub fn get_result(
        env: Env,
        request_type: u32,
        handle: BytesN<32>,
    ) -> Result<OracleValue, BrokerError> {
        let request_type = RequestType::from_u32(request_type)?;
        Ok(storage::result(&env, request_type, &handle))
    }

    pub fn get_string_result(env: Env, handle: BytesN<32>) -> String {
        match storage::result(&env, RequestType::Text, &handle) {
            OracleValue::Text(text) => text,
            _ => String::from_str(&env, ""),
        }
    }

    pub fn get_uint_result(env: Env, handle: BytesN<32>) -> u128 {
        match storage::result(&env, RequestType::Uint, &handle) {
            OracleValue::Uint(number) => number,
            _ => 0,
        }
    }

    pub fn get_bool_result(env: Env, handle: BytesN<32>) -> bool {
        match storage::result(&env, RequestType::Bool, &handle) {
            OracleValue::Bool(flag) => flag,
            _ => false,
        }
    }

    pub fn get_balance_result(env: Env, handle: BytesN<32>) -> u128 {
        match storage::result(&env, RequestType::AccountBalance, &handle) {
            OracleValue::Balance(amount) => amount,
            _ => 0,
        }
    }

    /// Get the dispatch record of a request.
    pub fn get_request(env: Env, handle: BytesN<32>) -> Result<RequestRecord, BrokerError> {
        storage::request(&env, &handle).ok_or(BrokerError::UnknownRequest)
    }

    /// Get handles `requester` dispatched, oldest first, starting at
    /// position `start`. At most `limit` entries (capped at 100) per call.
    pub fn get_history(env: Env, requester: Address, start: u32, limit: u32) -> Vec<BytesN<32>> {
        storage::history_page(&env, &requester, start, limit)
    }

    /// Get how many requests `requester` has dispatched.
    pub fn get_history_len(env: Env, requester: Address) -> u32 {
        storage::history_len(&env, &requester)
    }

    /// Get the (names, values) a request was submitted with.
    pub fn get_params(env: Env, handle: BytesN<32>) -> (Vec<String>, Vec<String>) {
        storage::params(&env, &handle)
    }

    /// Get the handle of the most recent fulfillment, if any.
    pub fn get_last_request_id(env: Env) -> Option<BytesN<32>> {
        storage::last_request_id(&env)
    }

    /// Encode a job id string into the transport's 32-byte key.
    pub fn encode_job_id(env: Env, job_id: String) -> Result<BytesN<32>, BrokerError> {
        job_id::encode_job_id(&env, &job_id)
    }

    pub fn get_fee(env: Env) -> Result<i128, BrokerError> {
        Self::require_initialized(&env)?;
        storage::fee(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, BrokerError> {
        storage::admin(&env)
    }

    pub fn get_transport(env: Env) -> Result<Address, BrokerError> {
        Self::require_initialized(&env)?;
        storage::transport(&env)
    }

    pub fn get_token(env: Env) -> Result<Address, BrokerError> {
        Self::require_initialized(&env)?;
        storage::token(&env)
    }

    pub fn is_manager(env: Env, account: Address) -> Result<bool, BrokerError> {
        access::has_manager_role(&env, &account)
    }

    /// Get the payment token balance held by the broker.
    pub fn custody_balance(env: Env) -> Result<i128, BrokerError> {
        Self::require_initialized(&env)?;
        escrow::custody_balance(&env)
    }

    // --- Internal helpers ---

    fn require_initialized(env: &Env) -> Result<(), BrokerError> {
        if !storage::has_admin(env) {
            return Err(BrokerError::NotInitialized);
        }
        Ok(())
    }

    /// Pay, build, send and record one request. Parameter counts and the
    /// request type are already validated.
    fn dispatch(
        env: &Env,
        requester: Address,
        oracle: Address,
        job_id: String,
        request_type: RequestType,
        param_names: Vec<String>,
        param_values: Vec<String>,
    ) -> Result<BytesN<32>, BrokerError> {
        let job_key = job_id::encode_job_id(env, &job_id)?;
        if job_id::is_zero_key(&job_key) {
            return Err(BrokerError::InvalidJobId);
        }

        requester.require_auth();

        // Fee is read once per dispatch; later changes never touch this request
        let fee = storage::fee(env)?;
        escrow::collect_fee(env, &requester, fee)?;

        let mut request = OracleRequest::new(
            env,
            job_key,
            env.current_contract_address(),
            request_type.callback_fn(env),
        );
        for (name, value) in param_names.iter().zip(param_values.iter()) {
            request.add_param(name, value);
        }

        let transport = OracleTransportClient::new(env, &storage::transport(env)?);
        let handle = transport.send(&oracle, &request, &fee);
        if storage::request(env, &handle).is_some() {
            return Err(BrokerError::DuplicateHandle);
        }

        let record = RequestRecord {
            requester: requester.clone(),
            request_type,
            oracle,
            payment: fee,
            expires_at: env.ledger().timestamp() + REQUEST_TIMEOUT_SECS,
            status: RequestStatus::Pending,
        };
        storage::set_request(env, &handle, &record);
        storage::set_params(env, &handle, &param_names, &param_values);
        storage::push_history(env, &requester, &handle);
        storage::extend_instance_ttl(env);

        log!(env, "request dispatched", handle, requester);
        env.events().publish(
            (symbol_short!("requested"), request_type.topic()),
            (handle.clone(), requester),
        );

        Ok(handle)
    }

    /// Gate shared by every fulfillment entry point: only the transport may
    /// call, the handle must be ours, pending, and of the entry point's type.
    fn accept_fulfillment(
        env: &Env,
        handle: &BytesN<32>,
        expected: RequestType,
    ) -> Result<(), BrokerError> {
        Self::require_initialized(env)?;
        storage::transport(env)?.require_auth();

        let mut record = storage::request(env, handle).ok_or(BrokerError::UnknownRequest)?;
        if record.request_type != expected {
            return Err(BrokerError::RequestTypeMismatch);
        }
        if record.status != RequestStatus::Pending {
            return Err(BrokerError::RequestNotPending);
        }

        record.status = RequestStatus::Fulfilled;
        storage::set_request(env, handle, &record);
        storage::set_last_request_id(env, handle);

        log!(env, "request fulfilled", handle.clone());
        Ok(())
    }
}
