//! Destination-chain half: `onMessageReceived`.
//!
//! The message and the asset travel separately, and the message may arrive first. The handler
//! only creates the escrow once the transport reports the paired deposit as claimed; until then it
//! fails with `UnclaimedAsset` and a relayer resubmits later.

use bridge_extension_types::{escrow_init_code, escrow_salt, CanonicalMessage};
use stylus_sdk::alloy_primitives::{Address, U256};

use crate::{
    config::{CallContext, ExtensionConfig},
    errors::BridgeCallError,
    transport::{AssetTransport, EscrowFactory},
};

/// Outcome of the ordering gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Paired asset not claimed yet; retry later.
    Defer,
    Proceed,
}

pub fn gate(claimed: bool) -> GateDecision {
    if claimed {
        GateDecision::Proceed
    } else {
        GateDecision::Defer
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscrowCreated {
    pub depends_on_index: U256,
    pub origin_network: u32,
    pub escrow: Address,
}

/// Authenticate the delivery, decode the message, check the claim and create the escrow.
///
/// Attached value is forwarded to the escrow constructor.
pub fn on_message_received<H>(
    host: &mut H,
    ctx: &CallContext,
    config: &ExtensionConfig,
    origin_address: Address,
    origin_network: u32,
    payload: &[u8],
) -> Result<EscrowCreated, BridgeCallError>
where
    H: AssetTransport + EscrowFactory,
{
    if ctx.sender != config.bridge {
        return Err(BridgeCallError::SenderNotTransport);
    }
    if origin_address != ctx.this {
        return Err(BridgeCallError::OriginNotSelf);
    }

    let message = CanonicalMessage::decode(payload)?;
    let leaf_index = deposit_index(message.depends_on_index)?;

    if gate(host.is_claimed(leaf_index, origin_network)?) == GateDecision::Defer {
        return Err(BridgeCallError::UnclaimedAsset {
            depends_on_index: message.depends_on_index,
            origin_network,
        });
    }

    let params = message.escrow_params(config.bridge, origin_network);
    let init_code = escrow_init_code(&config.escrow_creation_code, &params);
    let escrow = host.create_escrow(
        &init_code,
        escrow_salt(message.depends_on_index),
        ctx.value,
    )?;

    Ok(EscrowCreated {
        depends_on_index: message.depends_on_index,
        origin_network,
        escrow,
    })
}

/// Deposit indices are `uint32` on the transport; anything wider cannot name a real deposit.
fn deposit_index(depends_on_index: U256) -> Result<u32, BridgeCallError> {
    if depends_on_index > U256::from(u32::MAX) {
        return Err(BridgeCallError::MalformedMessage);
    }
    Ok(depends_on_index.to::<u32>())
}
