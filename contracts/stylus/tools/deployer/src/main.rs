use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use regex::Regex;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Deploy the bridge extension with `cargo stylus deploy` and record it per network.
///
/// Escrow addresses are only reachable when the extension sits at the same address on every
/// chain, so a deployment landing anywhere else than the networks already recorded is rejected
/// unless `--allow-address-mismatch` is given.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Directory containing the Stylus contract crate (where `cargo stylus deploy` should be run).
    ///
    /// In this repo, the contract crate lives under `src/` (eg `src/bridge-extension/`).
    #[arg(long, default_value = "src/bridge-extension")]
    contract_dir: PathBuf,

    /// RPC URL used by `cargo stylus deploy`.
    #[arg(long, env = "RPC_URL")]
    rpc_url: String,

    /// Path to a file containing the deployer private key.
    #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "private_key")]
    private_key_path: Option<String>,

    /// Private key (hex string, 0x...).
    #[arg(long, env = "PKEY", conflicts_with = "private_key_path")]
    private_key: Option<String>,

    /// Deployments file shared by every network.
    #[arg(long, default_value = "deployments.json")]
    deployments_path: PathBuf,

    /// Key under each network to store this contract.
    #[arg(long, default_value = "bridge-extension")]
    contract_key: String,

    /// Network name (eg, devnet, arb-sepolia).
    #[arg(long, default_value = "devnet")]
    network: String,

    /// Owner recorded by the constructor.
    #[arg(long, env = "OWNER_ADDRESS")]
    owner: String,

    /// LxLy bridge on the target network.
    #[arg(long, env = "BRIDGE_ADDRESS")]
    bridge: String,

    /// File holding the escrow creation code as hex. Must be the same file for every network.
    #[arg(long, env = "ESCROW_CREATION_CODE_PATH")]
    escrow_creation_code_path: PathBuf,

    /// Record the deployment even if its address differs from other networks.
    #[arg(long)]
    allow_address_mismatch: bool,

    /// Extra args to pass through to `cargo stylus deploy` (after `--`).
    ///
    /// Example:
    /// `-- --estimate-gas`
    #[arg(last = true)]
    passthrough: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut root = read_deployments_json(&cli.deployments_path)?;
    let escrow_code = fs::read_to_string(&cli.escrow_creation_code_path).with_context(|| {
        format!("failed reading {}", cli.escrow_creation_code_path.display())
    })?;
    let ctor_args = constructor_args(&cli.owner, &cli.bridge, &escrow_code)?;
    let (address, tx_hashes, raw_output) = run_cargo_stylus_deploy(&cli, &ctor_args)?;

    let mismatches = address_mismatches(&root, &cli.contract_key, &cli.network, &address);
    if !mismatches.is_empty() {
        let listed = mismatches
            .iter()
            .map(|(network, other)| format!("  {network}: {other}"))
            .collect::<Vec<_>>()
            .join("\n");
        if !cli.allow_address_mismatch {
            return Err(anyhow!(
                "`{}` landed at {} on {}, but is recorded elsewhere at:\n{}\n\
                 escrows derived on those chains would be unreachable; \
                 redeploy from a matching deployer nonce or pass --allow-address-mismatch",
                cli.contract_key,
                address,
                cli.network,
                listed
            ));
        }
        eprintln!("warning: address mismatch recorded anyway:\n{listed}");
    }

    record_deployment(&mut root, &cli, &address, &tx_hashes, &raw_output);
    write_json_atomic(&cli.deployments_path, &root)?;

    println!("Deployed `{}` to {} on {}", cli.contract_key, address, cli.network);
    Ok(())
}

/// Arguments for the contract constructor, which configures the extension in the deployment
/// transaction itself.
fn constructor_args(owner: &str, bridge: &str, escrow_code: &str) -> Result<Vec<String>> {
    let re_address = Regex::new(r"^0x[a-fA-F0-9]{40}$")?;
    let re_code = Regex::new(r"^(0x)?([a-fA-F0-9]{2})+$")?;

    for (name, value) in [("owner", owner), ("bridge", bridge)] {
        if !re_address.is_match(value) {
            return Err(anyhow!("--{name} is not a 0x-prefixed address: {value}"));
        }
        if value[2..].chars().all(|c| c == '0') {
            return Err(anyhow!("--{name} must not be the zero address"));
        }
    }

    let code = escrow_code.trim();
    if !re_code.is_match(code) {
        return Err(anyhow!("escrow creation code is not non-empty hex"));
    }
    let code = code.strip_prefix("0x").unwrap_or(code);

    Ok(vec![owner.to_string(), bridge.to_string(), format!("0x{code}")])
}

fn run_cargo_stylus_deploy(
    cli: &Cli,
    ctor_args: &[String],
) -> Result<(String, Vec<String>, String)> {
    // Example output lines we parse (as shown in the repo README):
    //   Deploying program to address 0x...
    //   Confirmed tx 0x...
    let re_address = Regex::new(r"Deploying program to address (0x[a-fA-F0-9]{40})")?;
    let re_tx = Regex::new(r"Confirmed tx (0x[a-fA-F0-9]{64})")?;

    let mut cmd = Command::new("cargo");
    cmd.current_dir(&cli.contract_dir);
    cmd.arg("stylus").arg("deploy");
    cmd.arg("-e").arg(&cli.rpc_url);

    if let Some(ref pk_path) = cli.private_key_path {
        cmd.arg("--private-key-path").arg(pk_path);
    } else if let Some(ref pk) = cli.private_key {
        cmd.arg("--private-key").arg(pk);
    } else {
        return Err(anyhow!(
            "missing deployer key: provide --private-key-path or --private-key (or set PRIV_KEY_PATH/PKEY)"
        ));
    }

    // Keep stdout/stderr for parsing and for debugging when runs fail.
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    // Allow passing flags like --estimate-gas, --mode, etc.
    if !cli.passthrough.is_empty() {
        cmd.args(&cli.passthrough);
    }

    // Last, since it takes every remaining value.
    cmd.arg("--constructor-args").args(ctor_args);

    let output = cmd
        .output()
        .context("failed to run `cargo stylus deploy`")?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let combined = format!("{stdout}\n{stderr}");

    if !output.status.success() {
        return Err(anyhow!(
            "`cargo stylus deploy` failed (exit {}):\n{}",
            output.status,
            combined
        ));
    }

    let address = re_address
        .captures_iter(&combined)
        .next()
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
        .ok_or_else(|| {
            anyhow!("could not parse deployed address from `cargo stylus deploy` output")
        })?;

    let tx_hashes: Vec<String> = re_tx
        .captures_iter(&combined)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    Ok((address, tx_hashes, combined))
}

fn read_deployments_json(path: &Path) -> Result<Value> {
    let existing = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?
    } else {
        String::new()
    };

    let root: Value = if existing.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(&existing)
            .with_context(|| format!("failed parsing JSON in {}", path.display()))?
    };

    if root.is_object() {
        Ok(root)
    } else {
        Ok(json!({}))
    }
}

/// Networks other than `network` recording `contract_key` at an address other than `address`.
fn address_mismatches(
    root: &Value,
    contract_key: &str,
    network: &str,
    address: &str,
) -> Vec<(String, String)> {
    let Some(networks) = root.get("networks").and_then(Value::as_object) else {
        return Vec::new();
    };

    networks
        .iter()
        .filter(|(name, _)| name.as_str() != network)
        .filter_map(|(name, entries)| {
            let recorded = entries.get(contract_key)?.get("address")?.as_str()?;
            (!recorded.eq_ignore_ascii_case(address)).then(|| (name.clone(), recorded.to_string()))
        })
        .collect()
}

fn record_deployment(
    root: &mut Value,
    cli: &Cli,
    address: &str,
    tx_hashes: &[String],
    raw_output: &str,
) {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    root["updated_at"] = json!(now);

    // root.networks[network][contract_key] = { address, tx hashes, ... }
    if root.get("networks").and_then(Value::as_object).is_none() {
        root["networks"] = json!({});
    }
    if root["networks"].get(&cli.network).and_then(Value::as_object).is_none() {
        root["networks"][&cli.network] = json!({});
    }

    let mut entry = json!({
        "address": address,
        "rpc_url": cli.rpc_url,
        "deployed_at": now,
    });

    if !tx_hashes.is_empty() {
        entry["tx_hashes"] = json!(tx_hashes);
    }

    // Keep raw output for debugging, truncated so the file stays reviewable.
    let trimmed = raw_output.trim();
    if !trimmed.is_empty() {
        entry["cargo_stylus_output"] = json!(truncate_utf8(trimmed, 16_000));
    }

    root["networks"][&cli.network][&cli.contract_key] = entry;
}

fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised =
        serde_json::to_string_pretty(value).context("failed serialising deployments JSON")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
