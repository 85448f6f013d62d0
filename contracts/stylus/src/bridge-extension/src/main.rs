#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]

#[cfg(not(any(test, feature = "export-abi")))]
#[no_mangle]
pub extern "C" fn main() {}

/// ABI export entrypoint used by `cargo stylus export-abi`.
#[cfg(feature = "export-abi")]
fn main() {
    use stylus_sdk::abi::export::print_abi;

    // Derived from the `#[public]` impl on `BridgeExtension`, including `onMessageReceived`.
    use bridge_extension::BridgeExtension;

    print_abi::<BridgeExtension>("BUSL-1.1", "pragma solidity ^0.8.20;");
}
