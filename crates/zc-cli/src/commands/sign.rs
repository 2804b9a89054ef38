//! Key generation, signing into the chain, and signature checks.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::{debug, info};
use zc_chain::{sign_message, verify_signature, ChainEngine, Metadata};

use crate::config::Config;
use crate::keys::KeyPair;

/// Handle `zc keygen`.
pub fn cmd_keygen(config: &Config, force: bool) -> Result<()> {
    let path = &config.key_file;
    if path.exists() && !force {
        bail!(
            "keypair already exists at {} (use --force to replace it)",
            path.display()
        );
    }

    let keypair = KeyPair::generate();
    keypair.save(path)?;
    info!(path = %path.display(), "generated keypair");

    println!("{} Keypair generated", "✓".green().bold());
    println!("  {}: {}", "Key file".bold(), path.display());
    println!("  {}: {}", "Public key".bold(), keypair.public_hex());
    Ok(())
}

/// Handle `zc log <message>`: sign with the local key and append.
pub fn cmd_log(config: &Config, message: &str) -> Result<()> {
    let keypair = KeyPair::load(&config.key_file)?;
    let signature = sign_message(&keypair.private_key, message.as_bytes());

    let chain = ChainEngine::open(&config.chain_path).with_context(|| {
        format!("failed to open chain at {}", config.chain_path.display())
    })?;

    let mut metadata = Metadata::new();
    metadata.insert("user".to_string(), current_user().into());
    metadata.insert("hostname".to_string(), hostname().into());

    let entry = chain
        .append(message, &signature, &keypair.public_hex(), metadata)
        .context("failed to append log entry")?;

    println!("{} Log entry added to chain", "✓".green().bold());
    println!("  {}: {}", "Message".bold(), entry.message);
    println!("  {}: {}", "Signature".bold(), preview(&entry.signature));
    println!("  {}: {}", "Hash".bold(), preview(&entry.current_hash));
    println!("  {}: {}", "Prev Hash".bold(), preview(&entry.prev_hash));
    println!("  {}: {}", "Chain length".bold(), chain.len());
    Ok(())
}

/// Handle `zc verify <message> <signature>`.
///
/// Uses `pubkey` when given, otherwise the public half of the local keypair.
pub fn cmd_verify(
    config: &Config,
    message: &str,
    signature: &str,
    pubkey: Option<String>,
) -> Result<()> {
    let pubkey = match pubkey {
        Some(pubkey) => pubkey,
        None => KeyPair::load(&config.key_file)?.public_hex(),
    };

    if verify_signature(&pubkey, message.as_bytes(), signature) {
        println!("{} Signature valid", "✓".green().bold());
        Ok(())
    } else {
        println!("{} Signature invalid", "✗".red().bold());
        bail!("signature verification failed")
    }
}

/// First 32 characters of a hex string, with `...` when truncated.
fn preview(hash: &str) -> String {
    match hash.get(..32) {
        Some(head) if head.len() < hash.len() => format!("{head}..."),
        _ => hash.to_string(),
    }
}

fn current_user() -> String {
    whoami::username()
}

fn hostname() -> String {
    whoami::fallible::hostname().unwrap_or_else(|err| {
        debug!(error = %err, "hostname lookup failed");
        "unknown".to_string()
    })
}
