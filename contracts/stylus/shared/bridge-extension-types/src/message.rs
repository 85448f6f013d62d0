//! Canonical message carried over the message transport.
//!
//! It is the only thing the destination chain learns about a request, so the encoding is fixed
//! to Solidity's `abi.encode(uint256, address, address, address, bytes)`.

use alloc::vec::Vec;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;

use crate::escrow::EscrowParams;

type WireMessage = (U256, Address, Address, Address, Bytes);

/// Errors while decoding a canonical message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageError {
    /// Payload is not a valid ABI encoding of the message tuple.
    Malformed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalMessage {
    /// Deposit index of the paired asset transfer; also the escrow's CREATE2 salt.
    pub depends_on_index: U256,
    pub call_address: Address,
    pub fallback_address: Address,
    /// Native sentinel for native and wrapped-native transfers.
    pub origin_asset: Address,
    pub call_data: Vec<u8>,
}

impl CanonicalMessage {
    pub fn encode(&self) -> Vec<u8> {
        (
            self.depends_on_index,
            self.call_address,
            self.fallback_address,
            self.origin_asset,
            Bytes::copy_from_slice(&self.call_data),
        )
            .abi_encode_params()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageError> {
        let (depends_on_index, call_address, fallback_address, origin_asset, call_data) =
            <WireMessage as SolValue>::abi_decode_params(payload, true)
                .map_err(|_| MessageError::Malformed)?;
        Ok(Self {
            depends_on_index,
            call_address,
            fallback_address,
            origin_asset,
            call_data: call_data.to_vec(),
        })
    }

    /// Escrow constructor arguments as rebuilt from this message on the destination chain.
    pub fn escrow_params(&self, bridge: Address, origin_network: u32) -> EscrowParams {
        EscrowParams {
            bridge,
            origin_network,
            origin_asset: self.origin_asset,
            call_address: self.call_address,
            fallback_address: self.fallback_address,
            call_data: self.call_data.clone(),
        }
    }
}
