//! Types shared by the bridge-and-call extension contract and its off-chain tooling.
//!
//! Both sides must derive byte-identical escrow addresses and canonical messages, so the
//! derivation and the codec live here and nowhere else.

#![no_std]

extern crate alloc;

pub mod asset;
pub mod escrow;
pub mod message;

pub use asset::{classify, AssetKind, NATIVE_ASSET};
pub use escrow::{compute_escrow_address, escrow_init_code, escrow_salt, EscrowParams};
pub use message::{CanonicalMessage, MessageError};
