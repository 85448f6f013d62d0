//! Bridge-and-call extension for the LxLy bridge.
//!
//! On the origin chain `bridgeAndCall` escrows an asset to the precomputed address of an escrow
//! contract that does not exist yet, then sends a canonical message describing the call. On the
//! destination chain the bridge delivers that message to `onMessageReceived` on the same address,
//! which creates the escrow once the paired asset transfer has been claimed.

#![cfg_attr(not(any(test, feature = "export-abi")), no_std)]

extern crate alloc;

pub mod callback;
pub mod config;
pub mod errors;
pub mod extension;
pub mod interfaces;
pub mod orchestrator;
pub mod transport;

#[cfg(test)]
mod testing;

pub use extension::BridgeExtension;
