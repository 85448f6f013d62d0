//! In-memory chain backing every collaborator trait, for off-chain tests.
//!
//! `transact` mirrors EVM revert semantics: state is restored when the closure returns `Err`.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};

use bridge_extension_types::{escrow::create2_address, NATIVE_ASSET};
use stylus_sdk::alloy_primitives::{keccak256, Address, FixedBytes, U256};

use crate::{
    errors::BridgeCallError,
    transport::{
        AssetDeposit, AssetTransport, EscrowFactory, MessageDeposit, MessageTransport,
        TokenCustody,
    },
};

pub mod fixtures {
    use stylus_sdk::alloy_primitives::{address, Address, U256};

    use crate::config::{CallContext, ExtensionConfig};

    pub const ORIGIN_NETWORK: u32 = 1;
    pub const DESTINATION_NETWORK: u32 = 2;

    pub const EXTENSION: Address = address!("64B20Eb25AEd030FD510EF93B9135278B152f6a6");
    pub const BRIDGE: Address = address!("2a3DD3EB832aF982ec71669E178424b10Dca2EDe");
    pub const USER: Address = address!("1000000000000000000000000000000000000001");
    pub const TOKEN: Address = address!("2000000000000000000000000000000000000002");
    pub const WETH: Address = address!("3000000000000000000000000000000000000003");
    pub const CALL_ADDRESS: Address = address!("4000000000000000000000000000000000000004");
    pub const FALLBACK_ADDRESS: Address = address!("5000000000000000000000000000000000000005");

    /// Stand-in escrow creation code; only its bytes matter for address derivation.
    pub const ESCROW_CODE: [u8; 12] = [
        0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15, 0x61, 0x00, 0x10, 0x57,
    ];

    pub fn config() -> ExtensionConfig {
        ExtensionConfig {
            bridge: BRIDGE,
            escrow_creation_code: ESCROW_CODE.to_vec(),
        }
    }

    /// Call from the user into the extension.
    pub fn ctx(value: U256) -> CallContext {
        CallContext {
            this: EXTENSION,
            sender: USER,
            value,
        }
    }

    /// Delivery from the bridge into the extension.
    pub fn bridge_ctx(value: U256) -> CallContext {
        CallContext {
            this: EXTENSION,
            sender: BRIDGE,
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedAssetDeposit {
    /// Counter value right after this deposit.
    pub index: U256,
    pub value: U256,
    pub destination_network: u32,
    pub destination_address: Address,
    pub amount: U256,
    pub token: Address,
    pub force_update_global_exit_root: bool,
    pub permit_data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedMessage {
    pub index: U256,
    pub destination_network: u32,
    pub destination_address: Address,
    pub force_update_global_exit_root: bool,
    pub metadata: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedEscrow {
    pub init_code: Vec<u8>,
    pub value: U256,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockChain {
    pub network_id: u32,
    pub bridge: Address,
    pub extension: Address,
    pub wrapped_native: Address,
    pub deposit_count: U256,
    /// Extra deposits slipped in during `bridge_asset`, as a reentrant caller would.
    pub interleaved_deposits: u64,
    pub asset_deposits: Vec<RecordedAssetDeposit>,
    pub messages: Vec<RecordedMessage>,
    /// (token, holder) => balance
    pub balances: BTreeMap<(Address, Address), U256>,
    /// (token, owner, spender) => allowance
    pub allowances: BTreeMap<(Address, Address, Address), U256>,
    /// (deposit index, origin network)
    pub claimed: BTreeSet<(u32, u32)>,
    pub escrows: BTreeMap<Address, CreatedEscrow>,
}

impl MockChain {
    pub fn on(network_id: u32) -> Self {
        Self {
            network_id,
            bridge: fixtures::BRIDGE,
            extension: fixtures::EXTENSION,
            wrapped_native: fixtures::WETH,
            ..Default::default()
        }
    }

    pub fn origin() -> Self {
        Self::on(fixtures::ORIGIN_NETWORK)
    }

    pub fn destination() -> Self {
        Self::on(fixtures::DESTINATION_NETWORK)
    }

    pub fn transact<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, BridgeCallError>,
    ) -> Result<T, BridgeCallError> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    pub fn mint(&mut self, token: Address, holder: Address, amount: U256) {
        *self.balances.entry((token, holder)).or_default() += amount;
    }

    pub fn approve_as(&mut self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((token, owner, spender), amount);
    }

    pub fn balance_of(&self, token: Address, holder: Address) -> U256 {
        self.balances.get(&(token, holder)).copied().unwrap_or_default()
    }

    pub fn claim(&mut self, index: u32, origin_network: u32) {
        self.claimed.insert((index, origin_network));
    }

    /// Claim an asset deposit made on another chain: mark it and pay its destination address.
    pub fn claim_deposit(&mut self, origin_network: u32, deposit: &RecordedAssetDeposit) {
        self.claim(deposit.index.to::<u32>(), origin_network);
        self.mint(deposit.token, deposit.destination_address, deposit.amount);
    }

    fn spend_allowance(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), BridgeCallError> {
        let allowance = self.allowances.get(&(token, owner, spender)).copied().unwrap_or_default();
        if allowance < amount {
            return Err(revert(token, b"insufficient allowance"));
        }
        self.allowances.insert((token, owner, spender), allowance - amount);
        Ok(())
    }

    fn move_balance(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), BridgeCallError> {
        let balance = self.balance_of(token, from);
        if balance < amount {
            return Err(revert(token, b"insufficient balance"));
        }
        self.balances.insert((token, from), balance - amount);
        self.mint(token, to, amount);
        Ok(())
    }
}

fn revert(target: Address, reason: &[u8]) -> BridgeCallError {
    BridgeCallError::CallFailed {
        target,
        reason: reason.to_vec(),
    }
}

impl AssetTransport for MockChain {
    fn deposit_count(&self) -> Result<U256, BridgeCallError> {
        Ok(self.deposit_count)
    }

    fn network_id(&self) -> Result<u32, BridgeCallError> {
        Ok(self.network_id)
    }

    fn wrapped_native_token(&self) -> Result<Address, BridgeCallError> {
        Ok(self.wrapped_native)
    }

    fn bridge_asset(&mut self, deposit: AssetDeposit<'_>) -> Result<(), BridgeCallError> {
        if deposit.token == NATIVE_ASSET {
            if deposit.value != deposit.amount {
                return Err(revert(self.bridge, b"AmountDoesNotMatchMsgValue"));
            }
        } else {
            if deposit.value != U256::ZERO {
                return Err(revert(self.bridge, b"MsgValueNotZero"));
            }
            let (extension, bridge) = (self.extension, self.bridge);
            self.spend_allowance(deposit.token, extension, bridge, deposit.amount)?;
            self.move_balance(deposit.token, extension, bridge, deposit.amount)?;
        }

        self.deposit_count += U256::from(1u64);
        self.asset_deposits.push(RecordedAssetDeposit {
            index: self.deposit_count,
            value: deposit.value,
            destination_network: deposit.destination_network,
            destination_address: deposit.destination_address,
            amount: deposit.amount,
            token: deposit.token,
            force_update_global_exit_root: deposit.force_update_global_exit_root,
            permit_data: deposit.permit_data.to_vec(),
        });
        self.deposit_count += U256::from(self.interleaved_deposits);
        Ok(())
    }

    fn is_claimed(&self, index: u32, origin_network: u32) -> Result<bool, BridgeCallError> {
        Ok(self.claimed.contains(&(index, origin_network)))
    }
}

impl MessageTransport for MockChain {
    fn bridge_message(&mut self, message: MessageDeposit<'_>) -> Result<(), BridgeCallError> {
        self.deposit_count += U256::from(1u64);
        self.messages.push(RecordedMessage {
            index: self.deposit_count,
            destination_network: message.destination_network,
            destination_address: message.destination_address,
            force_update_global_exit_root: message.force_update_global_exit_root,
            metadata: message.metadata.to_vec(),
        });
        Ok(())
    }
}

impl TokenCustody for MockChain {
    fn transfer_from(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), BridgeCallError> {
        let spender = self.extension;
        self.spend_allowance(token, from, spender, amount)?;
        self.move_balance(token, from, to, amount)
    }

    fn approve(
        &mut self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), BridgeCallError> {
        let owner = self.extension;
        self.approve_as(token, owner, spender, amount);
        Ok(())
    }
}

impl EscrowFactory for MockChain {
    fn create_escrow(
        &mut self,
        init_code: &[u8],
        salt: FixedBytes<32>,
        value: U256,
    ) -> Result<Address, BridgeCallError> {
        let address = create2_address(self.extension, salt, keccak256(init_code));
        if self.escrows.contains_key(&address) {
            return Err(BridgeCallError::EscrowCreationFailed { reason: Vec::new() });
        }
        self.escrows.insert(
            address,
            CreatedEscrow {
                init_code: init_code.to_vec(),
                value,
            },
        );
        Ok(address)
    }
}
