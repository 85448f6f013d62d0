//! Collaborator seams: the asset transport, the message transport, token custody and escrow
//! creation.
//!
//! The orchestrator and the callback handler only ever talk to these traits. On-chain they are
//! backed by raw ABI calls (`onchain`); tests back them with an in-memory chain.

pub mod onchain;

use stylus_sdk::alloy_primitives::{Address, FixedBytes, U256};

use crate::errors::BridgeCallError;

/// One `bridgeAsset` invocation.
#[derive(Clone, Copy, Debug)]
pub struct AssetDeposit<'a> {
    /// Call value; equals `amount` for the native asset, zero otherwise.
    pub value: U256,
    pub destination_network: u32,
    pub destination_address: Address,
    pub amount: U256,
    pub token: Address,
    pub force_update_global_exit_root: bool,
    pub permit_data: &'a [u8],
}

/// One `bridgeMessage` invocation.
#[derive(Clone, Copy, Debug)]
pub struct MessageDeposit<'a> {
    pub destination_network: u32,
    pub destination_address: Address,
    pub force_update_global_exit_root: bool,
    pub metadata: &'a [u8],
}

pub trait AssetTransport {
    /// Current deposit counter. Each deposit advances it by exactly one.
    fn deposit_count(&self) -> Result<U256, BridgeCallError>;

    fn network_id(&self) -> Result<u32, BridgeCallError>;

    /// The transport's wrapped-native token (zero when the chain has none).
    fn wrapped_native_token(&self) -> Result<Address, BridgeCallError>;

    fn bridge_asset(&mut self, deposit: AssetDeposit<'_>) -> Result<(), BridgeCallError>;

    /// Whether deposit `index` from `origin_network` has been claimed on this chain.
    fn is_claimed(&self, index: u32, origin_network: u32) -> Result<bool, BridgeCallError>;
}

pub trait MessageTransport {
    fn bridge_message(&mut self, message: MessageDeposit<'_>) -> Result<(), BridgeCallError>;
}

/// ERC20 operations performed by this contract as `msg.sender`.
pub trait TokenCustody {
    fn transfer_from(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), BridgeCallError>;

    fn approve(&mut self, token: Address, spender: Address, amount: U256)
        -> Result<(), BridgeCallError>;
}

/// CREATE2 deployment with this contract as deployer.
pub trait EscrowFactory {
    fn create_escrow(
        &mut self,
        init_code: &[u8],
        salt: FixedBytes<32>,
        value: U256,
    ) -> Result<Address, BridgeCallError>;
}
