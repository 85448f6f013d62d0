use alloc::vec::Vec;

use bridge_extension_types::MessageError;
use stylus_sdk::alloy_primitives::{Address, U256};

/// Errors raised by the orchestrator, the callback handler and the collaborator adapters.
///
/// Every one of them aborts the call; nothing is recovered locally. `UnclaimedAsset` is the
/// only one a relayer is expected to retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeCallError {
    NotInitialized,
    AlreadyInitialized,
    Unauthorized { account: Address },
    InvalidAddress,
    InvalidCreationCode,
    /// Native path: attached value differs from the declared amount.
    AmountMismatch { value: U256, amount: U256 },
    /// The deposit counter moved by something other than our single asset deposit.
    IndexMismatch { expected: U256, actual: U256 },
    SenderNotTransport,
    OriginNotSelf,
    MalformedMessage,
    UnclaimedAsset { depends_on_index: U256, origin_network: u32 },
    CallFailed { target: Address, reason: Vec<u8> },
    EscrowCreationFailed { reason: Vec<u8> },
}

impl BridgeCallError {
    /// Whether a later resubmission of the same callback can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeCallError::UnclaimedAsset { .. })
    }
}

impl From<MessageError> for BridgeCallError {
    fn from(_: MessageError) -> Self {
        BridgeCallError::MalformedMessage
    }
}
