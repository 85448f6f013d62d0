//! Off-chain counterpart of the bridge extension: computes the same escrow addresses and
//! canonical messages the contract computes, so relayers can act before anything is on-chain.

use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

mod encoder;

use encoder::{
    classify_token, decode_message, encode_message, parse_hex, predict_escrow, Prediction,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict the escrow address for a deposit index.
    Predict(PredictArgs),
    /// ABI-encode a canonical bridge-and-call message.
    EncodeMessage(MessageArgs),
    /// Decode a canonical bridge-and-call message from hex.
    DecodeMessage {
        /// Message payload (0x-prefixed hex).
        payload: String,
    },
    /// Classify a token the way `bridgeAndCall` does.
    Classify {
        #[arg(long)]
        token: Address,
        /// Wrapped-native token reported by the bridge (`WETHToken()`).
        #[arg(long)]
        wrapped_native: Address,
    },
}

#[derive(Args, Debug)]
struct MessageArgs {
    #[arg(long)]
    depends_on_index: U256,

    #[arg(long)]
    call_address: Address,

    #[arg(long)]
    fallback_address: Address,

    /// Zero address for native (and wrapped-native) deposits.
    #[arg(long, default_value_t = Address::ZERO)]
    origin_asset: Address,

    /// Calldata for the escrow's call (0x-prefixed hex).
    #[arg(long, default_value = "0x")]
    call_data: String,
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[command(flatten)]
    message: MessageArgs,

    /// Address of the extension; the CREATE2 deployer on the destination chain.
    #[arg(long, env = "BRIDGE_EXTENSION_ADDRESS")]
    extension: Address,

    /// Bridge address on the destination chain.
    #[arg(long, env = "BRIDGE_ADDRESS")]
    bridge: Address,

    /// Network id of the chain the deposit originates from.
    #[arg(long)]
    origin_network: u32,

    /// Escrow creation code (0x-prefixed hex).
    #[arg(long, conflicts_with = "creation_code_path")]
    creation_code: Option<String>,

    /// File holding the escrow creation code as hex.
    #[arg(long, conflicts_with = "creation_code")]
    creation_code_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Predict(args) => {
            let creation_code = load_creation_code(&args)?;
            let message = build_message(&args.message)?;
            let prediction: Prediction = predict_escrow(
                args.extension,
                args.bridge,
                args.origin_network,
                &creation_code,
                &message,
            );
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        Command::EncodeMessage(args) => {
            let message = build_message(&args)?;
            println!("0x{}", hex::encode(encode_message(&message)));
        }
        Command::DecodeMessage { payload } => {
            let decoded = decode_message(&parse_hex(&payload)?)?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        Command::Classify {
            token,
            wrapped_native,
        } => {
            let classified = classify_token(token, wrapped_native);
            println!("{}", serde_json::to_string_pretty(&classified)?);
        }
    }
    Ok(())
}

fn build_message(args: &MessageArgs) -> Result<bridge_extension_types::CanonicalMessage> {
    Ok(bridge_extension_types::CanonicalMessage {
        depends_on_index: args.depends_on_index,
        call_address: args.call_address,
        fallback_address: args.fallback_address,
        origin_asset: args.origin_asset,
        call_data: parse_hex(&args.call_data).context("invalid --call-data")?,
    })
}

fn load_creation_code(args: &PredictArgs) -> Result<Vec<u8>> {
    let raw = match (&args.creation_code, &args.creation_code_path) {
        (Some(code), _) => code.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed reading {}", path.display()))?,
        (None, None) => bail!(
            "missing escrow creation code: provide --creation-code or --creation-code-path"
        ),
    };
    let code = parse_hex(raw.trim()).context("invalid escrow creation code")?;
    if code.is_empty() {
        bail!("escrow creation code is empty");
    }
    Ok(code)
}
