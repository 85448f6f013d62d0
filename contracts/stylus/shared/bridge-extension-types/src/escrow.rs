//! Deterministic address of the destination-side escrow contract.
//!
//! The escrow does not exist when its address is first needed: the origin chain escrows funds
//! to it before anyone has created it. Its address is therefore a pure function of the deployer,
//! a salt derived from `dependsOnIndex`, and the hash of its init code (creation code followed
//! by the ABI-encoded constructor arguments).

use alloc::vec::Vec;

use alloy_primitives::{keccak256, Address, Bytes, FixedBytes, U256};
use alloy_sol_types::SolValue;

/// Constructor arguments of the escrow contract.
///
/// Never stored: both chains recompute it from the same inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscrowParams {
    pub bridge: Address,
    pub origin_network: u32,
    pub origin_asset: Address,
    pub call_address: Address,
    pub fallback_address: Address,
    pub call_data: Vec<u8>,
}

impl EscrowParams {
    /// `abi.encode(bridge, originNetwork, originAsset, callAddress, fallbackAddress, callData)`
    /// with types `(address, uint32, address, address, address, bytes)`.
    pub fn encode_constructor_args(&self) -> Vec<u8> {
        (
            self.bridge,
            self.origin_network,
            self.origin_asset,
            self.call_address,
            self.fallback_address,
            Bytes::copy_from_slice(&self.call_data),
        )
            .abi_encode_params()
    }
}

/// CREATE2 salt for a given `dependsOnIndex` (the index as a big-endian word).
pub fn escrow_salt(depends_on_index: U256) -> FixedBytes<32> {
    FixedBytes(depends_on_index.to_be_bytes::<32>())
}

/// Creation code followed by the encoded constructor arguments.
pub fn escrow_init_code(creation_code: &[u8], params: &EscrowParams) -> Vec<u8> {
    let args = params.encode_constructor_args();
    let mut init_code = Vec::with_capacity(creation_code.len() + args.len());
    init_code.extend_from_slice(creation_code);
    init_code.extend_from_slice(&args);
    init_code
}

/// `keccak256(0xff || deployer || salt || initCodeHash)[12..]`.
pub fn create2_address(
    deployer: Address,
    salt: FixedBytes<32>,
    init_code_hash: FixedBytes<32>,
) -> Address {
    deployer.create2(salt, init_code_hash)
}

/// Address the escrow for `depends_on_index` will have once `deployer` creates it.
///
/// Pure: the same inputs give the same address on every chain, provided the deployer and the
/// creation code are identical there. Nothing here can detect when they are not.
pub fn compute_escrow_address(
    deployer: Address,
    depends_on_index: U256,
    creation_code: &[u8],
    params: &EscrowParams,
) -> Address {
    let init_code_hash = keccak256(escrow_init_code(creation_code, params));
    create2_address(deployer, escrow_salt(depends_on_index), init_code_hash)
}
