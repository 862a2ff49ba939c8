use soroban_sdk::{contractclient, contracttype, Address, BytesN, Env, String, Symbol, Vec};

/// One named request parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct RequestParam {
    pub name: String,
    pub value: String,
}

/// Outbound request as handed to the oracle transport.
///
/// `callback` is the contract the transport must call back and `callback_fn`
/// the entry point on it; parameters are delivered in insertion order.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct OracleRequest {
    pub job_id: BytesN<32>,
    pub callback: Address,
    pub callback_fn: Symbol,
    pub params: Vec<RequestParam>,
}

impl OracleRequest {
    pub fn new(env: &Env, job_id: BytesN<32>, callback: Address, callback_fn: Symbol) -> Self {
        Self {
            job_id,
            callback,
            callback_fn,
            params: Vec::new(env),
        }
    }

    pub fn add_param(&mut self, name: String, value: String) {
        self.params.push_back(RequestParam { name, value });
    }
}

/// Interface of the oracle transport contract.
///
/// The transport mints a fresh handle per `send` and calls
/// `callback.callback_fn(handle, value)` at most once per handle.
#[contractclient(name = "OracleTransportClient")]
pub trait OracleTransport {
    fn send(env: Env, oracle: Address, request: OracleRequest, payment: i128) -> BytesN<32>;

    fn cancel(env: Env, handle: BytesN<32>, payment: i128, callback_fn: Symbol, expiration: u64);
}
