use alloy_primitives::{keccak256, Address};
use anyhow::{anyhow, Context, Result};
use bridge_extension_types::{
    classify, compute_escrow_address, escrow_init_code, escrow_salt, AssetKind, CanonicalMessage,
};
use serde::Serialize;

/// Escrow address plus the intermediate values it was derived from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub escrow: String,
    pub salt: String,
    pub init_code_hash: String,
    pub constructor_args: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedMessage {
    pub depends_on_index: String,
    pub call_address: String,
    pub fallback_address: String,
    pub origin_asset: String,
    pub call_data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub kind: &'static str,
    pub origin_asset: String,
    pub pulls_from_caller: bool,
}

/// Accepts hex with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).with_context(|| format!("not valid hex: {s}"))
}

fn hex_string(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn encode_message(message: &CanonicalMessage) -> Vec<u8> {
    message.encode()
}

pub fn decode_message(payload: &[u8]) -> Result<DecodedMessage> {
    let message = CanonicalMessage::decode(payload)
        .map_err(|_| anyhow!("payload is not a canonical bridge-and-call message"))?;
    Ok(DecodedMessage {
        depends_on_index: message.depends_on_index.to_string(),
        call_address: message.call_address.to_string(),
        fallback_address: message.fallback_address.to_string(),
        origin_asset: message.origin_asset.to_string(),
        call_data: hex_string(&message.call_data),
    })
}

/// Destination-side view: `extension` deploys the escrow, `bridge` is the local bridge.
pub fn predict_escrow(
    extension: Address,
    bridge: Address,
    origin_network: u32,
    creation_code: &[u8],
    message: &CanonicalMessage,
) -> Prediction {
    let params = message.escrow_params(bridge, origin_network);
    let init_code = escrow_init_code(creation_code, &params);
    let escrow =
        compute_escrow_address(extension, message.depends_on_index, creation_code, &params);

    Prediction {
        escrow: escrow.to_string(),
        salt: escrow_salt(message.depends_on_index).to_string(),
        init_code_hash: keccak256(&init_code).to_string(),
        constructor_args: hex_string(&params.encode_constructor_args()),
    }
}

pub fn classify_token(token: Address, wrapped_native: Address) -> Classification {
    let kind = classify(token, wrapped_native);
    Classification {
        kind: match kind {
            AssetKind::Native => "native",
            AssetKind::WrappedNative => "wrapped-native",
            AssetKind::Erc20 => "erc20",
        },
        origin_asset: kind.origin_asset(token).to_string(),
        pulls_from_caller: kind.pulls_from_caller(),
    }
}
