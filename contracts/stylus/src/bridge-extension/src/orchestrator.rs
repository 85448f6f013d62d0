//! Origin-chain half: `bridgeAndCall`.

use alloc::vec::Vec;

use bridge_extension_types::{
    classify, compute_escrow_address, AssetKind, CanonicalMessage, EscrowParams,
};
use stylus_sdk::alloy_primitives::{Address, U256};

use crate::{
    config::{CallContext, ExtensionConfig},
    errors::BridgeCallError,
    transport::{AssetDeposit, AssetTransport, MessageDeposit, MessageTransport, TokenCustody},
};

/// A user's bridge-and-call request. Lives for one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeAndCallRequest {
    /// Token to bridge; the native sentinel means the chain's gas token.
    pub token: Address,
    pub amount: U256,
    /// Forwarded to the asset transport untouched.
    pub permit_data: Vec<u8>,
    pub destination_network: u32,
    pub call_address: Address,
    pub fallback_address: Address,
    pub call_data: Vec<u8>,
    pub force_update_global_exit_root: bool,
}

/// What one successful `bridgeAndCall` produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeAndCallReceipt {
    pub depends_on_index: U256,
    pub kind: AssetKind,
    pub origin_asset: Address,
    /// Address the escrow will have on the destination chain.
    pub escrow: Address,
    pub message: CanonicalMessage,
}

/// Escrow `request.amount` to the future escrow address and send the paired message.
///
/// Exactly one asset deposit is made, so `dependsOnIndex` is the deposit counter plus one and the
/// counter must read exactly that afterwards. Any error leaves the caller to revert the whole
/// transaction; nothing here is committed on its own.
pub fn bridge_and_call<H>(
    host: &mut H,
    ctx: &CallContext,
    config: &ExtensionConfig,
    request: &BridgeAndCallRequest,
) -> Result<BridgeAndCallReceipt, BridgeCallError>
where
    H: AssetTransport + MessageTransport + TokenCustody,
{
    let depends_on_index = host.deposit_count()? + U256::from(1u64);

    let kind = classify(request.token, host.wrapped_native_token()?);
    let value = match kind {
        AssetKind::Native => {
            if ctx.value != request.amount {
                return Err(BridgeCallError::AmountMismatch {
                    value: ctx.value,
                    amount: request.amount,
                });
            }
            request.amount
        }
        AssetKind::WrappedNative | AssetKind::Erc20 => {
            // tokens move by allowance only
            if ctx.value != U256::ZERO {
                return Err(BridgeCallError::AmountMismatch {
                    value: ctx.value,
                    amount: U256::ZERO,
                });
            }
            host.transfer_from(request.token, ctx.sender, ctx.this, request.amount)?;
            host.approve(request.token, config.bridge, request.amount)?;
            U256::ZERO
        }
    };

    let origin_asset = kind.origin_asset(request.token);
    let params = EscrowParams {
        bridge: config.bridge,
        origin_network: host.network_id()?,
        origin_asset,
        call_address: request.call_address,
        fallback_address: request.fallback_address,
        call_data: request.call_data.clone(),
    };
    let escrow = compute_escrow_address(
        ctx.this,
        depends_on_index,
        &config.escrow_creation_code,
        &params,
    );

    host.bridge_asset(AssetDeposit {
        value,
        destination_network: request.destination_network,
        destination_address: escrow,
        amount: request.amount,
        token: request.token,
        force_update_global_exit_root: request.force_update_global_exit_root,
        permit_data: &request.permit_data,
    })?;

    let actual = host.deposit_count()?;
    if actual != depends_on_index {
        return Err(BridgeCallError::IndexMismatch {
            expected: depends_on_index,
            actual,
        });
    }

    let message = CanonicalMessage {
        depends_on_index,
        call_address: request.call_address,
        fallback_address: request.fallback_address,
        origin_asset,
        call_data: request.call_data.clone(),
    };
    host.bridge_message(MessageDeposit {
        destination_network: request.destination_network,
        destination_address: ctx.this,
        force_update_global_exit_root: request.force_update_global_exit_root,
        metadata: &message.encode(),
    })?;

    Ok(BridgeAndCallReceipt {
        depends_on_index,
        kind,
        origin_asset,
        escrow,
        message,
    })
}
