//! Stylus entrypoint: storage, public ABI, events and Solidity errors.
//!
//! The `#[public]` methods only load configuration and call context, delegate to the
//! orchestrator or the callback handler, and emit events. Returning `Err` reverts the transaction,
//! which is what makes a failed `bridgeAndCall` leave no trace.

use stylus_sdk::{
    abi::Bytes,
    alloy_primitives::{keccak256, Address, FixedBytes, U256},
    alloy_sol_types::sol,
    prelude::*,
    stylus_core::log,
};
use stylus_sdk::stylus_proc::SolidityError;

use bridge_extension_types::{escrow, EscrowParams};

use crate::{
    callback,
    config::{CallContext, ExtensionConfig},
    errors::BridgeCallError,
    orchestrator::{self, BridgeAndCallRequest},
    transport::onchain::OnchainHost,
};

sol! {
    event BridgeAndCall(
        uint256 indexed dependsOnIndex,
        address indexed sender,
        address escrow,
        uint32 destinationNetwork,
        address originAsset,
        uint256 amount
    );
    event EscrowCreated(
        uint256 indexed dependsOnIndex,
        uint32 indexed originNetwork,
        address escrow
    );
    event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

    error NotInitialized();
    error AlreadyInitialized();
    error Unauthorized(address account);
    error InvalidAddress();
    error InvalidCreationCode();
    error AmountDoesNotMatchMsgValue(uint256 value, uint256 amount);
    error IndexMismatch(uint256 expected, uint256 actual);
    error SenderMustBeBridge();
    error OriginMustBeBridgeExtension();
    error MalformedMessage();
    error UnclaimedAsset(uint256 dependsOnIndex, uint32 originNetwork);
    error ExternalCallFailed(address target, bytes reason);
    error EscrowCreationFailed(bytes reason);
}

#[derive(SolidityError)]
pub enum ExtensionError {
    NotInitialized(NotInitialized),
    AlreadyInitialized(AlreadyInitialized),
    Unauthorized(Unauthorized),
    InvalidAddress(InvalidAddress),
    InvalidCreationCode(InvalidCreationCode),
    AmountDoesNotMatchMsgValue(AmountDoesNotMatchMsgValue),
    IndexMismatch(IndexMismatch),
    SenderMustBeBridge(SenderMustBeBridge),
    OriginMustBeBridgeExtension(OriginMustBeBridgeExtension),
    MalformedMessage(MalformedMessage),
    UnclaimedAsset(UnclaimedAsset),
    ExternalCallFailed(ExternalCallFailed),
    EscrowCreationFailed(EscrowCreationFailed),
}

impl From<BridgeCallError> for ExtensionError {
    fn from(err: BridgeCallError) -> Self {
        match err {
            BridgeCallError::NotInitialized => ExtensionError::NotInitialized(NotInitialized {}),
            BridgeCallError::AlreadyInitialized => {
                ExtensionError::AlreadyInitialized(AlreadyInitialized {})
            }
            BridgeCallError::Unauthorized { account } => {
                ExtensionError::Unauthorized(Unauthorized { account })
            }
            BridgeCallError::InvalidAddress => ExtensionError::InvalidAddress(InvalidAddress {}),
            BridgeCallError::InvalidCreationCode => {
                ExtensionError::InvalidCreationCode(InvalidCreationCode {})
            }
            BridgeCallError::AmountMismatch { value, amount } => {
                ExtensionError::AmountDoesNotMatchMsgValue(AmountDoesNotMatchMsgValue {
                    value,
                    amount,
                })
            }
            BridgeCallError::IndexMismatch { expected, actual } => {
                ExtensionError::IndexMismatch(IndexMismatch { expected, actual })
            }
            BridgeCallError::SenderNotTransport => {
                ExtensionError::SenderMustBeBridge(SenderMustBeBridge {})
            }
            BridgeCallError::OriginNotSelf => {
                ExtensionError::OriginMustBeBridgeExtension(OriginMustBeBridgeExtension {})
            }
            BridgeCallError::MalformedMessage => {
                ExtensionError::MalformedMessage(MalformedMessage {})
            }
            BridgeCallError::UnclaimedAsset {
                depends_on_index,
                origin_network,
            } => ExtensionError::UnclaimedAsset(UnclaimedAsset {
                dependsOnIndex: depends_on_index,
                originNetwork: origin_network,
            }),
            BridgeCallError::CallFailed { target, reason } => {
                ExtensionError::ExternalCallFailed(ExternalCallFailed {
                    target,
                    reason: reason.into(),
                })
            }
            BridgeCallError::EscrowCreationFailed { reason } => {
                ExtensionError::EscrowCreationFailed(EscrowCreationFailed {
                    reason: reason.into(),
                })
            }
        }
    }
}

sol_storage! {
    /// Must be deployed at the same address on every chain it bridges between: that address is
    /// both the message peer and the CREATE2 deployer of every escrow.
    #[entrypoint]
    pub struct BridgeExtension {
        address owner;
        /// LxLy bridge on this chain (asset and message transport).
        address bridge;
        /// Escrow creation code, identical on every chain.
        bytes escrow_creation_code;
    }
}

#[public]
impl BridgeExtension {
    /// Runs inside the deployment transaction, so nobody can configure the address before the
    /// deployer does. The bridge and the creation code cannot change afterwards.
    #[constructor]
    pub fn constructor(
        &mut self,
        owner: Address,
        bridge: Address,
        escrow_creation_code: Bytes,
    ) -> Result<(), ExtensionError> {
        if self.bridge.get() != Address::ZERO {
            return Err(BridgeCallError::AlreadyInitialized.into());
        }
        if owner == Address::ZERO {
            return Err(BridgeCallError::InvalidAddress.into());
        }
        let config = ExtensionConfig::new(bridge, escrow_creation_code.to_vec())?;

        self.owner.set(owner);
        self.bridge.set(config.bridge);
        self.escrow_creation_code.set_bytes(&config.escrow_creation_code);

        log(
            self.vm(),
            OwnershipTransferred {
                previousOwner: Address::ZERO,
                newOwner: owner,
            },
        );
        Ok(())
    }

    /// Bridge `amount` of `token` to `destinationNetwork` and have `callAddress` called with it
    /// there. Pass the native sentinel (zero address) with `msg.value == amount` for gas tokens.
    #[payable]
    pub fn bridge_and_call(
        &mut self,
        token: Address,
        amount: U256,
        permit_data: Bytes,
        destination_network: u32,
        call_address: Address,
        fallback_address: Address,
        call_data: Bytes,
        force_update_global_exit_root: bool,
    ) -> Result<(), ExtensionError> {
        let config = self.config()?;
        let ctx = self.context();
        let request = BridgeAndCallRequest {
            token,
            amount,
            permit_data: permit_data.to_vec(),
            destination_network,
            call_address,
            fallback_address,
            call_data: call_data.to_vec(),
            force_update_global_exit_root,
        };

        let mut host = OnchainHost::new(config.bridge);
        let receipt = orchestrator::bridge_and_call(&mut host, &ctx, &config, &request)?;

        log(
            self.vm(),
            BridgeAndCall {
                dependsOnIndex: receipt.depends_on_index,
                sender: ctx.sender,
                escrow: receipt.escrow,
                destinationNetwork: destination_network,
                originAsset: receipt.origin_asset,
                amount,
            },
        );
        Ok(())
    }

    /// Bridge callback. Reverts with `UnclaimedAsset` until the paired deposit is claimed here;
    /// relayers retry on that error only.
    #[payable]
    pub fn on_message_received(
        &mut self,
        origin_address: Address,
        origin_network: u32,
        data: Bytes,
    ) -> Result<(), ExtensionError> {
        let config = self.config()?;
        let ctx = self.context();

        let mut host = OnchainHost::new(config.bridge);
        let created = callback::on_message_received(
            &mut host,
            &ctx,
            &config,
            origin_address,
            origin_network,
            &data,
        )?;

        log(
            self.vm(),
            EscrowCreated {
                dependsOnIndex: created.depends_on_index,
                originNetwork: created.origin_network,
                escrow: created.escrow,
            },
        );
        Ok(())
    }

    /// Address the escrow for these parameters has (or will have) on this chain.
    pub fn compute_escrow_address(
        &self,
        depends_on_index: U256,
        origin_network: u32,
        origin_asset: Address,
        call_address: Address,
        fallback_address: Address,
        call_data: Bytes,
    ) -> Result<Address, ExtensionError> {
        let config = self.config()?;
        let params = EscrowParams {
            bridge: config.bridge,
            origin_network,
            origin_asset,
            call_address,
            fallback_address,
            call_data: call_data.to_vec(),
        };
        Ok(escrow::compute_escrow_address(
            self.vm().contract_address(),
            depends_on_index,
            &config.escrow_creation_code,
            &params,
        ))
    }

    pub fn escrow_creation_code_hash(&self) -> FixedBytes<32> {
        keccak256(self.escrow_creation_code.get_bytes())
    }

    pub fn bridge(&self) -> Address {
        self.bridge.get()
    }

    pub fn owner(&self) -> Address {
        self.owner.get()
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) -> Result<(), ExtensionError> {
        let owner = self.owner.get();
        if owner == Address::ZERO {
            return Err(BridgeCallError::NotInitialized.into());
        }
        let sender = self.vm().msg_sender();
        if sender != owner {
            return Err(BridgeCallError::Unauthorized { account: sender }.into());
        }
        if new_owner == Address::ZERO {
            return Err(BridgeCallError::InvalidAddress.into());
        }

        self.owner.set(new_owner);
        log(
            self.vm(),
            OwnershipTransferred {
                previousOwner: owner,
                newOwner: new_owner,
            },
        );
        Ok(())
    }
}

impl BridgeExtension {
    fn config(&self) -> Result<ExtensionConfig, BridgeCallError> {
        let bridge = self.bridge.get();
        if bridge == Address::ZERO {
            return Err(BridgeCallError::NotInitialized);
        }
        Ok(ExtensionConfig {
            bridge,
            escrow_creation_code: self.escrow_creation_code.get_bytes(),
        })
    }

    fn context(&self) -> CallContext {
        CallContext {
            this: self.vm().contract_address(),
            sender: self.vm().msg_sender(),
            value: self.vm().msg_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{vec, vec::Vec};
    use stylus_sdk::{
        alloy_primitives::address,
        alloy_sol_types::{SolError, SolEvent},
        testing::TestVM,
    };

    use crate::testing::{fixtures, MockChain};

    const ATTACKER: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

    fn vm() -> TestVM {
        let vm = TestVM::default();
        vm.set_contract_address(fixtures::EXTENSION);
        vm.set_sender(fixtures::USER);
        vm
    }

    fn code() -> Bytes {
        Bytes::from(fixtures::ESCROW_CODE.to_vec())
    }

    fn configured(vm: &TestVM) -> BridgeExtension {
        let mut contract = BridgeExtension::from(vm);
        assert!(contract
            .constructor(fixtures::USER, fixtures::BRIDGE, code())
            .is_ok());
        contract
    }

    #[test]
    fn constructor_records_configuration() {
        let vm = vm();
        let contract = configured(&vm);

        assert_eq!(contract.owner(), fixtures::USER);
        assert_eq!(contract.bridge(), fixtures::BRIDGE);
        assert_eq!(
            contract.escrow_creation_code_hash(),
            keccak256(fixtures::ESCROW_CODE)
        );

        let logs = vm.get_emitted_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].0[0], OwnershipTransferred::SIGNATURE_HASH);
    }

    #[test]
    fn constructor_validates_inputs() {
        let vm = vm();
        let mut contract = BridgeExtension::from(&vm);

        assert!(matches!(
            contract.constructor(Address::ZERO, fixtures::BRIDGE, code()),
            Err(ExtensionError::InvalidAddress(_))
        ));
        assert!(matches!(
            contract.constructor(fixtures::USER, Address::ZERO, code()),
            Err(ExtensionError::InvalidAddress(_))
        ));
        assert!(matches!(
            contract.constructor(fixtures::USER, fixtures::BRIDGE, Bytes::from(Vec::new())),
            Err(ExtensionError::InvalidCreationCode(_))
        ));
        assert_eq!(contract.bridge(), Address::ZERO);
    }

    #[test]
    fn configuration_cannot_be_taken_over() {
        let vm = vm();
        let mut contract = configured(&vm);

        vm.set_sender(ATTACKER);
        assert!(matches!(
            contract.constructor(ATTACKER, ATTACKER, code()),
            Err(ExtensionError::AlreadyInitialized(_))
        ));
        assert_eq!(contract.owner(), fixtures::USER);
        assert_eq!(contract.bridge(), fixtures::BRIDGE);
    }

    #[test]
    fn entrypoints_require_configuration() {
        let vm = vm();
        let mut contract = BridgeExtension::from(&vm);

        assert!(matches!(
            contract.bridge_and_call(
                Address::ZERO,
                U256::ZERO,
                Bytes::from(Vec::new()),
                fixtures::DESTINATION_NETWORK,
                fixtures::CALL_ADDRESS,
                fixtures::FALLBACK_ADDRESS,
                Bytes::from(Vec::new()),
                false,
            ),
            Err(ExtensionError::NotInitialized(_))
        ));

        vm.set_sender(fixtures::BRIDGE);
        assert!(matches!(
            contract.on_message_received(
                fixtures::EXTENSION,
                fixtures::ORIGIN_NETWORK,
                Bytes::from(Vec::new()),
            ),
            Err(ExtensionError::NotInitialized(_))
        ));

        assert!(matches!(
            contract.compute_escrow_address(
                U256::from(1u64),
                fixtures::ORIGIN_NETWORK,
                Address::ZERO,
                fixtures::CALL_ADDRESS,
                fixtures::FALLBACK_ADDRESS,
                Bytes::from(Vec::new()),
            ),
            Err(ExtensionError::NotInitialized(_))
        ));
    }

    #[test]
    fn only_owner_transfers_ownership() {
        let vm = vm();
        let mut contract = configured(&vm);

        vm.set_sender(ATTACKER);
        assert!(matches!(
            contract.transfer_ownership(ATTACKER),
            Err(ExtensionError::Unauthorized(Unauthorized { account })) if account == ATTACKER
        ));

        vm.set_sender(fixtures::USER);
        assert!(matches!(
            contract.transfer_ownership(Address::ZERO),
            Err(ExtensionError::InvalidAddress(_))
        ));
        assert!(contract.transfer_ownership(ATTACKER).is_ok());
        assert_eq!(contract.owner(), ATTACKER);
    }

    #[test]
    fn view_matches_escrow_used_by_bridge_and_call() {
        let vm = vm();
        let contract = configured(&vm);

        let mut chain = MockChain::origin();
        let ctx = fixtures::ctx(U256::from(9u64));
        let request = orchestrator::BridgeAndCallRequest {
            token: Address::ZERO,
            amount: U256::from(9u64),
            permit_data: Vec::new(),
            destination_network: fixtures::DESTINATION_NETWORK,
            call_address: fixtures::CALL_ADDRESS,
            fallback_address: fixtures::FALLBACK_ADDRESS,
            call_data: vec![0xab, 0xcd],
            force_update_global_exit_root: false,
        };
        let config = fixtures::config();
        let receipt = chain
            .transact(|host| orchestrator::bridge_and_call(host, &ctx, &config, &request))
            .unwrap();

        let viewed = contract
            .compute_escrow_address(
                receipt.depends_on_index,
                fixtures::ORIGIN_NETWORK,
                receipt.origin_asset,
                fixtures::CALL_ADDRESS,
                fixtures::FALLBACK_ADDRESS,
                Bytes::from(vec![0xab, 0xcd]),
            )
            .ok();
        assert_eq!(viewed, Some(receipt.escrow));
    }

    #[test]
    fn errors_revert_with_solidity_selectors() {
        let revert = |err: BridgeCallError| -> Vec<u8> { ExtensionError::from(err).into() };

        assert_eq!(
            revert(BridgeCallError::SenderNotTransport)[..4],
            SenderMustBeBridge::SELECTOR
        );
        assert_eq!(
            revert(BridgeCallError::OriginNotSelf)[..4],
            OriginMustBeBridgeExtension::SELECTOR
        );
        assert_eq!(
            revert(BridgeCallError::MalformedMessage)[..4],
            MalformedMessage::SELECTOR
        );

        let data = revert(BridgeCallError::UnclaimedAsset {
            depends_on_index: U256::from(42u64),
            origin_network: fixtures::ORIGIN_NETWORK,
        });
        let decoded = UnclaimedAsset::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.dependsOnIndex, U256::from(42u64));
        assert_eq!(decoded.originNetwork, fixtures::ORIGIN_NETWORK);

        let data = revert(BridgeCallError::AmountMismatch {
            value: U256::from(4u64),
            amount: U256::from(5u64),
        });
        let decoded = AmountDoesNotMatchMsgValue::abi_decode(&data, true).unwrap();
        assert_eq!((decoded.value, decoded.amount), (U256::from(4u64), U256::from(5u64)));
    }
}
