//! Immutable configuration and per-call context.

use alloc::vec::Vec;

use stylus_sdk::alloy_primitives::{Address, U256};

use crate::errors::BridgeCallError;

/// Set once by the constructor, read on every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionConfig {
    /// The bridge acting as both asset and message transport.
    pub bridge: Address,
    /// Creation code of the escrow contract. Must be identical on every chain.
    pub escrow_creation_code: Vec<u8>,
}

impl ExtensionConfig {
    pub fn new(bridge: Address, escrow_creation_code: Vec<u8>) -> Result<Self, BridgeCallError> {
        if bridge == Address::ZERO {
            return Err(BridgeCallError::InvalidAddress);
        }
        if escrow_creation_code.is_empty() {
            return Err(BridgeCallError::InvalidCreationCode);
        }
        Ok(Self {
            bridge,
            escrow_creation_code,
        })
    }
}

/// Execution context of the current call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// This contract's own address: CREATE2 deployer and message peer on every chain.
    pub this: Address,
    pub sender: Address,
    pub value: U256,
}
