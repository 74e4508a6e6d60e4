//! Sign Ethereum transactions from the encrypted secrets mount.
//!
//! Usage:
//!   eth-sign                            # scripted demo walkthrough
//!   eth-sign --to 0x... --value 0.01    # direct mode
//!   eth-sign --to 0x... --value 0.01 --dry-run

use clap::Parser;
use eth_vault_sign::prelude::*;
use eth_vault_sign::{
    broadcast_transfer, keystore, load_private_key, sign_transfer, ui, KeyMaterial,
    NetworkProfile, SecretsConfig, SignedTransfer, TransferBuilder, DEFAULT_GAS_LIMIT,
    DEFAULT_NETWORK,
};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, TransactionRequest};
use ethers::utils::{parse_ether, to_checksum};
use log::debug;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// The demo sends a token amount to the burn address on Sepolia.
const DEMO_RECIPIENT: &str = "0x000000000000000000000000000000000000dEaD";
const DEMO_VALUE_ETH: &str = "0.001";
const DEMO_NETWORK: &str = "sepolia";
// Fixed fallback gas price for the offline demo: 20 gwei.
const OFFLINE_GAS_PRICE_WEI: u64 = 20_000_000_000;

#[derive(Parser, Debug)]
#[command(
    name = "eth-sign",
    about = "Sign Ethereum transactions from encrypted secrets mount"
)]
struct Cli {
    /// Recipient address
    #[arg(long)]
    to: Option<String>,

    /// Amount in ETH
    #[arg(long)]
    value: Option<String>,

    /// Network to use
    #[arg(long, default_value = DEFAULT_NETWORK)]
    network: String,

    /// Path to key JSON file
    #[arg(long)]
    key_file: Option<PathBuf>,

    /// Sign but don't broadcast
    #[arg(long)]
    dry_run: bool,

    /// Run interactive demo
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.demo || (cli.to.is_none() && cli.value.is_none()) {
        return demo_mode().await;
    }

    let (Some(to), Some(value)) = (cli.to.as_deref(), cli.value.as_deref()) else {
        return Err(Error::Usage(
            "Both --to and --value required for direct mode".to_string(),
        ));
    };

    let config = SecretsConfig::from_env();
    let (key, _source) = load_private_key(&config, cli.key_file.as_deref())?;

    let builder = TransferBuilder::connect(&cli.network, &key).await?;
    let tx = builder.build(to, value, DEFAULT_GAS_LIMIT).await?;
    let signed = sign_transfer(&builder.wallet, &tx)?;

    if cli.dry_run {
        println!();
        ui::info("Dry run - transaction NOT broadcast");
        println!("  Raw tx (for manual broadcast): 0x{}", hex::encode(&signed.raw));
        return Ok(());
    }

    println!();
    print!("{}Broadcast transaction? [y/N]: {}", ui::YELLOW, ui::RESET);
    io::stdout().flush().map_err(|e| Error::Io(e.to_string()))?;
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .map_err(|e| Error::Io(e.to_string()))?;

    if is_affirmative(&answer) {
        broadcast_transfer(&builder.provider, builder.network, &signed).await?;
    } else {
        ui::info("Transaction not broadcast");
    }
    Ok(())
}

/// Only a trimmed, lowercased "y" confirms a broadcast.
fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase() == "y"
}

/// Scripted walkthrough: verify the mount, load (or generate) a key, build
/// the fixed demo transfer, and sign it. Never broadcasts; never fails on
/// network errors.
async fn demo_mode() -> Result<()> {
    banner();
    let config = SecretsConfig::from_env();

    ui::info("Step 1: Verify encrypted secrets mount");
    if is_mount_point(&config.mount) {
        println!("  \u{2713} {} is mounted", config.mount.display());
    } else {
        ui::warn(format!(
            "  {} not mounted (demo mode, using test key)",
            config.mount.display()
        ));
    }
    println!();

    ui::info("Step 2: Load private key from encrypted storage");
    let key = if keystore::has_key_files(&config) {
        load_private_key(&config, None)?.0
    } else {
        ui::warn("No key file found - generating ephemeral test key for demo");
        let wallet = LocalWallet::new(&mut rand::thread_rng());
        println!("  Test address: {}", to_checksum(&wallet.address(), None));
        println!("  (This is an unfunded test wallet)");
        KeyMaterial::from_hex(&hex::encode(wallet.signer().to_bytes()))
    };
    println!();

    ui::info("Step 3: Build transfer transaction");
    println!("  Recipient: {DEMO_RECIPIENT}");
    println!("  Amount: {DEMO_VALUE_ETH} ETH");
    println!();

    ui::info("Step 4: Sign transaction (key never leaves encrypted mount)");
    match sign_online(&key).await {
        Ok(_signed) => {
            println!();
            ui::info("Step 5: Transaction ready");
            println!("  The signed transaction can now be broadcast to Sepolia testnet.");
            println!("  In production, you would pass --to/--value and confirm the broadcast.");
            println!();
            println!("{}{}{}", ui::CYAN, "═".repeat(63), ui::RESET);
            println!(
                "{}Demo complete! Key material remains only in encrypted mount.{}",
                ui::GREEN,
                ui::RESET
            );
            println!("{}{}{}", ui::CYAN, "═".repeat(63), ui::RESET);
        }
        Err(e) => {
            debug!("online demo path failed: {e}");
            ui::warn(format!("Network error (expected if no internet): {e}"));
            println!();
            offline_signing_demo(&key)?;
        }
    }
    Ok(())
}

/// Online path of the demo: fresh nonce, gas price, and balance from the
/// Sepolia RPC. Any failure here sends the demo down the offline path.
async fn sign_online(key: &KeyMaterial) -> Result<SignedTransfer> {
    let builder = TransferBuilder::connect(DEMO_NETWORK, key).await?;
    let tx = builder
        .build(DEMO_RECIPIENT, DEMO_VALUE_ETH, DEFAULT_GAS_LIMIT)
        .await?;
    sign_transfer(&builder.wallet, &tx)
}

/// Offline path: synthesize nonce 0 and a fixed 20 gwei gas price locally
/// to show signing works without connectivity.
fn offline_signing_demo(key: &KeyMaterial) -> Result<()> {
    ui::info("Offline signing demo (no network required):");
    let network = NetworkProfile::by_name(DEMO_NETWORK)?;
    let wallet = key.wallet()?.with_chain_id(network.chain_id);
    let to: Address = DEMO_RECIPIENT
        .parse()
        .map_err(|e| Error::InvalidAddress(format!("{DEMO_RECIPIENT}: {e}")))?;

    let tx = TransactionRequest::new()
        .to(to)
        .value(parse_ether(DEMO_VALUE_ETH).map_err(|e| Error::InvalidAmount(e.to_string()))?)
        .nonce(0u64)
        .gas(DEFAULT_GAS_LIMIT)
        .gas_price(OFFLINE_GAS_PRICE_WEI)
        .chain_id(network.chain_id);

    println!("  From: {}", to_checksum(&wallet.address(), None));
    sign_transfer(&wallet, &tx)?;
    println!();
    println!(
        "{}\u{2713} Transaction signed offline successfully{}",
        ui::GREEN,
        ui::RESET
    );
    Ok(())
}

/// Informational only: a negative result downgrades to a warning, it never
/// aborts the demo.
fn is_mount_point(path: &Path) -> bool {
    if let Ok(mounts) = std::fs::read_to_string("/proc/mounts") {
        let target = path.to_string_lossy();
        return mounts
            .lines()
            .any(|line| line.split_whitespace().nth(1) == Some(target.as_ref()));
    }
    path.exists()
}

fn banner() {
    println!();
    println!("{}╔════════════════════════════════════════════════════════════╗{}", ui::CYAN, ui::RESET);
    println!("{}║     Ethereum Transaction Signing Demo (Secure Sandbox)     ║{}", ui::CYAN, ui::RESET);
    println!("{}╚════════════════════════════════════════════════════════════╝{}", ui::CYAN, ui::RESET);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_lowercase_y_confirms() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("  y \n"));
        assert!(is_affirmative("Y\n")); // lowercased before comparison
        assert!(!is_affirmative("yes"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("\n"));
    }

    #[test]
    fn mount_probe_handles_missing_path() {
        assert!(!is_mount_point(Path::new("/definitely/not/a/mount/point")));
    }

    #[test]
    fn root_is_a_mount_point() {
        assert!(is_mount_point(Path::new("/")));
    }

    #[test]
    fn direct_mode_args_are_detected() {
        let cli = Cli::parse_from(["eth-sign", "--to", DEMO_RECIPIENT, "--value", "0.001"]);
        assert_eq!(cli.to.as_deref(), Some(DEMO_RECIPIENT));
        assert_eq!(cli.value.as_deref(), Some("0.001"));
        assert_eq!(cli.network, DEFAULT_NETWORK);
        assert!(!cli.dry_run);
        assert!(!cli.demo);
    }

    #[test]
    fn demo_is_default_without_args() {
        let cli = Cli::parse_from(["eth-sign"]);
        assert!(cli.to.is_none() && cli.value.is_none());
    }
}
