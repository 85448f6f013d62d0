use alloc::vec::Vec;

use stylus_sdk::{
    alloy_primitives::{Address, Bytes, FixedBytes, U256},
    alloy_sol_types::SolCall,
    call::RawCall,
    deploy::RawDeploy,
};

use crate::{
    errors::BridgeCallError,
    interfaces::{ILxLyBridge, IERC20},
    transport::{
        AssetDeposit, AssetTransport, EscrowFactory, MessageDeposit, MessageTransport,
        TokenCustody,
    },
};

/// Collaborators reached through raw calls from inside the Stylus contract.
pub struct OnchainHost {
    bridge: Address,
}

impl OnchainHost {
    pub fn new(bridge: Address) -> Self {
        Self { bridge }
    }

    fn static_call(&self, target: Address, calldata: &[u8]) -> Result<Vec<u8>, BridgeCallError> {
        unsafe { RawCall::new_static().call(target, calldata) }
            .map_err(|reason| BridgeCallError::CallFailed { target, reason })
    }

    fn call(
        &mut self,
        target: Address,
        value: U256,
        calldata: &[u8],
    ) -> Result<Vec<u8>, BridgeCallError> {
        unsafe { RawCall::new_with_value(value).call(target, calldata) }
            .map_err(|reason| BridgeCallError::CallFailed { target, reason })
    }

    /// `safeTransferFrom`-style acceptance: empty return data or an ABI `true`.
    fn expect_token_success(token: Address, out: &[u8]) -> Result<(), BridgeCallError> {
        if out.is_empty() {
            return Ok(());
        }
        if out.len() >= 32 && U256::from_be_slice(&out[0..32]) == U256::from(1u64) {
            return Ok(());
        }
        Err(BridgeCallError::CallFailed {
            target: token,
            reason: out.to_vec(),
        })
    }

    fn malformed_return(&self) -> BridgeCallError {
        BridgeCallError::CallFailed {
            target: self.bridge,
            reason: Vec::new(),
        }
    }
}

impl AssetTransport for OnchainHost {
    fn deposit_count(&self) -> Result<U256, BridgeCallError> {
        let out = self.static_call(self.bridge, &ILxLyBridge::depositCountCall {}.abi_encode())?;
        ILxLyBridge::depositCountCall::abi_decode_returns(&out, true)
            .map(|r| r._0)
            .map_err(|_| self.malformed_return())
    }

    fn network_id(&self) -> Result<u32, BridgeCallError> {
        let out = self.static_call(self.bridge, &ILxLyBridge::networkIDCall {}.abi_encode())?;
        ILxLyBridge::networkIDCall::abi_decode_returns(&out, true)
            .map(|r| r._0)
            .map_err(|_| self.malformed_return())
    }

    fn wrapped_native_token(&self) -> Result<Address, BridgeCallError> {
        let out = self.static_call(self.bridge, &ILxLyBridge::WETHTokenCall {}.abi_encode())?;
        ILxLyBridge::WETHTokenCall::abi_decode_returns(&out, true)
            .map(|r| r._0)
            .map_err(|_| self.malformed_return())
    }

    fn bridge_asset(&mut self, deposit: AssetDeposit<'_>) -> Result<(), BridgeCallError> {
        let calldata = ILxLyBridge::bridgeAssetCall {
            destinationNetwork: deposit.destination_network,
            destinationAddress: deposit.destination_address,
            amount: deposit.amount,
            token: deposit.token,
            forceUpdateGlobalExitRoot: deposit.force_update_global_exit_root,
            permitData: Bytes::copy_from_slice(deposit.permit_data),
        }
        .abi_encode();
        self.call(self.bridge, deposit.value, &calldata)?;
        Ok(())
    }

    fn is_claimed(&self, index: u32, origin_network: u32) -> Result<bool, BridgeCallError> {
        let calldata = ILxLyBridge::isClaimedCall {
            leafIndex: index,
            sourceBridgeNetwork: origin_network,
        }
        .abi_encode();
        let out = self.static_call(self.bridge, &calldata)?;
        ILxLyBridge::isClaimedCall::abi_decode_returns(&out, true)
            .map(|r| r._0)
            .map_err(|_| self.malformed_return())
    }
}

impl MessageTransport for OnchainHost {
    fn bridge_message(&mut self, message: MessageDeposit<'_>) -> Result<(), BridgeCallError> {
        let calldata = ILxLyBridge::bridgeMessageCall {
            destinationNetwork: message.destination_network,
            destinationAddress: message.destination_address,
            forceUpdateGlobalExitRoot: message.force_update_global_exit_root,
            metadata: Bytes::copy_from_slice(message.metadata),
        }
        .abi_encode();
        self.call(self.bridge, U256::ZERO, &calldata)?;
        Ok(())
    }
}

impl TokenCustody for OnchainHost {
    fn transfer_from(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), BridgeCallError> {
        let calldata = IERC20::transferFromCall { from, to, amount }.abi_encode();
        let out = self.call(token, U256::ZERO, &calldata)?;
        Self::expect_token_success(token, &out)
    }

    fn approve(
        &mut self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), BridgeCallError> {
        let calldata = IERC20::approveCall { spender, amount }.abi_encode();
        let out = self.call(token, U256::ZERO, &calldata)?;
        Self::expect_token_success(token, &out)
    }
}

impl EscrowFactory for OnchainHost {
    fn create_escrow(
        &mut self,
        init_code: &[u8],
        salt: FixedBytes<32>,
        value: U256,
    ) -> Result<Address, BridgeCallError> {
        // CREATE2 fails when the address is already occupied, so creation happens at most once.
        unsafe { RawDeploy::new().salt(salt).deploy(init_code, value) }
            .map_err(|reason| BridgeCallError::EscrowCreationFailed { reason })
    }
}
