//! Keypair file handling for the local signer.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use zc_chain::{keygen, public_key_for};

/// On-disk keypair, both halves hex-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeyPairFile {
    private_key: String,
    public_key: String,
}

/// A loaded Ed25519 keypair.
#[derive(Clone)]
pub struct KeyPair {
    pub private_key: [u8; 32],
    pub public_key: [u8; 32],
}

impl KeyPair {
    pub fn generate() -> Self {
        let (private_key, public_key) = keygen();
        Self {
            private_key,
            public_key,
        }
    }

    pub fn public_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    /// Read a keypair file and check that its halves belong together.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| {
            format!(
                "failed to read keypair from {} (run `zc keygen` first)",
                path.display()
            )
        })?;
        let file: KeyPairFile =
            serde_json::from_str(&json).context("failed to parse keypair JSON")?;

        let private_key = decode_key(&file.private_key).context("invalid private_key")?;
        let public_key = decode_key(&file.public_key).context("invalid public_key")?;
        if public_key_for(&private_key) != public_key {
            bail!("public key in {} does not match its private key", path.display());
        }

        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Write the keypair as JSON, readable only by the owner on unix.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = KeyPairFile {
            private_key: hex::encode(self.private_key),
            public_key: self.public_hex(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut out = options
            .open(path)
            .with_context(|| format!("failed to write keypair to {}", path.display()))?;
        out.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_hex())
            .finish_non_exhaustive()
    }
}

fn decode_key(hex_key: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(hex_key).context("not valid hex")?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow::anyhow!("expected 32 bytes, got {}", bytes.len()))
}
