//! Private key discovery on the encrypted secrets mount.
//!
//! Candidates are probed in order: an explicit `--key-file` path, three
//! well-known filenames under the mount root, then any other `*.json` file
//! in that directory. A candidate that is missing, unparseable, or lacks a
//! usable key field is skipped silently. The `ETH_PRIVATE_KEY` environment
//! variable is a last-resort fallback intended for testing only.

use crate::prelude::*;
use crate::ui;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use log::debug;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SECRETS_MOUNT: &str = "/mnt/secrets";
pub const SECRETS_MOUNT_ENV_VAR: &str = "SECRETS_MOUNT";
pub const KEY_ENV_VAR: &str = "ETH_PRIVATE_KEY";

/// Well-known filenames probed under the mount root, in order.
const WELL_KNOWN_KEY_FILES: [&str; 3] = ["eth-signing-key.json", "private-key.json", "wallet.json"];

/// Where the secrets mount lives. Constructed once at startup and passed
/// explicitly to whatever needs it.
#[derive(Debug, Clone)]
pub struct SecretsConfig {
    pub mount: PathBuf,
}

impl SecretsConfig {
    /// Read the mount root from `SECRETS_MOUNT`, defaulting to
    /// `/mnt/secrets`.
    pub fn from_env() -> Self {
        let mount = env::var(SECRETS_MOUNT_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_MOUNT));
        Self { mount }
    }
}

/// A 32-byte secret scalar, held as a normalized `0x`-prefixed hex string.
/// Lives in process memory only for the duration of one invocation.
#[derive(Clone)]
pub struct KeyMaterial(String);

impl KeyMaterial {
    /// Normalize a hex-encoded key, prepending `0x` if absent.
    pub fn from_hex(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("0x") {
            Self(raw.to_string())
        } else {
            Self(format!("0x{raw}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the signing wallet for this key.
    pub fn wallet(&self) -> Result<LocalWallet> {
        self.0
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| Error::PrivateKeyParse(e.to_string()))
    }

    /// The 20-byte address derived from this key.
    pub fn address(&self) -> Result<Address> {
        Ok(self.wallet()?.address())
    }
}

// Key material must never end up in logs via Debug formatting.
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// Which candidate satisfied the lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    File(PathBuf),
    Environment,
}

/// Accepted key-file shape: a JSON object carrying the key under any of
/// three field names.
#[derive(Deserialize)]
struct KeyFile {
    private_key: Option<String>,
    #[serde(rename = "privateKey")]
    private_key_camel: Option<String>,
    key: Option<String>,
}

impl KeyFile {
    fn into_key(self) -> Option<String> {
        self.private_key
            .or(self.private_key_camel)
            .or(self.key)
            .filter(|k| !k.is_empty())
    }
}

/// Ordered candidate paths: explicit path first, then well-known names,
/// then every other `*.json` under the mount root.
fn candidate_paths(config: &SecretsConfig, explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    for name in WELL_KNOWN_KEY_FILES {
        paths.push(config.mount.join(name));
    }
    if let Ok(entries) = fs::read_dir(&config.mount) {
        for entry in entries.flatten() {
            let path = entry.path();
            let is_json = path.extension().map_or(false, |ext| ext == "json");
            if is_json && !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

fn try_read_key(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let file: KeyFile = serde_json::from_str(&text).ok()?;
    file.into_key()
}

/// Whether any `*.json` file exists under the mount root. The demo uses
/// this to decide between a real lookup and an ephemeral test key.
pub fn has_key_files(config: &SecretsConfig) -> bool {
    fs::read_dir(&config.mount)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.path().extension().map_or(false, |ext| ext == "json"))
        })
        .unwrap_or(false)
}

/// Load the private key from the secrets mount, falling back to
/// `ETH_PRIVATE_KEY`. Per-candidate errors are skipped, not surfaced.
pub fn load_private_key(
    config: &SecretsConfig,
    explicit: Option<&Path>,
) -> Result<(KeyMaterial, KeySource)> {
    for path in candidate_paths(config, explicit) {
        if !path.exists() {
            debug!("candidate {} does not exist", path.display());
            continue;
        }
        match try_read_key(&path) {
            Some(key) => {
                ui::info(format!("Loaded key from: {}", path.display()));
                return Ok((KeyMaterial::from_hex(&key), KeySource::File(path)));
            }
            None => {
                debug!("candidate {} has no usable key field", path.display());
            }
        }
    }

    if let Ok(key) = env::var(KEY_ENV_VAR) {
        if !key.is_empty() {
            ui::warn(format!("Using {KEY_ENV_VAR} from environment (testing only)"));
            return Ok((KeyMaterial::from_hex(&key), KeySource::Environment));
        }
    }

    Err(Error::KeyNotFound(format!(
        "no private key found in {}. Expected JSON with a 'private_key' field.",
        config.mount.display()
    )))
}
