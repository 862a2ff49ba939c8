use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum BrokerError {
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,
    /// Caller lacks the required role (admin or manager)
    Unauthorized = 3,
    /// Parameter names and values have different lengths
    ParameterMismatch = 4,
    /// Request type is not one of the supported kinds
    UnsupportedRequestType = 5,
    /// Job id encodes to the all-zero key
    InvalidJobId = 6,
    /// Job id is longer than the codec accepts
    JobIdTooLong = 7,
    /// Requester has not approved the broker for the fee
    InsufficientAllowance = 8,
    /// Payment token transfer failed
    TransferFailed = 9,
    /// Fee must not be negative
    InvalidAmount = 10,
    /// Handle was never issued to this broker
    UnknownRequest = 11,
    /// Fulfillment arrived on the entry point of another request type
    RequestTypeMismatch = 12,
    /// Request was already fulfilled or cancelled
    RequestNotPending = 13,
    /// Custody balance is zero
    NothingToWithdraw = 14,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 15,
    /// Transport returned a handle that is already recorded
    DuplicateHandle = 16,
}
