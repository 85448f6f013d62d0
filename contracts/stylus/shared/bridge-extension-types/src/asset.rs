use alloy_primitives::Address;

/// Sentinel the asset transport uses for the chain's native gas token.
pub const NATIVE_ASSET: Address = Address::ZERO;

/// How a bridge-and-call request moves its asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    /// Native gas token, paid as call value.
    Native,
    /// The transport's wrapped representation of the native gas token.
    WrappedNative,
    /// Any other ERC20-like token.
    Erc20,
}

/// Classify `token` against the transport's wrapped-native token.
///
/// The native sentinel is checked first, so a chain reporting a zero wrapped-native token
/// still routes the sentinel through the native path.
pub fn classify(token: Address, wrapped_native: Address) -> AssetKind {
    if token == NATIVE_ASSET {
        AssetKind::Native
    } else if token == wrapped_native {
        AssetKind::WrappedNative
    } else {
        AssetKind::Erc20
    }
}

impl AssetKind {
    /// Asset identifier baked into the escrow constructor and the canonical message.
    ///
    /// Wrapped-native collapses to the native sentinel; the destination side treats both as native.
    pub fn origin_asset(self, token: Address) -> Address {
        match self {
            AssetKind::Native | AssetKind::WrappedNative => NATIVE_ASSET,
            AssetKind::Erc20 => token,
        }
    }

    /// Whether the asset has to be pulled from the caller before it can be bridged onward.
    pub fn pulls_from_caller(self) -> bool {
        !matches!(self, AssetKind::Native)
    }
}
