//! Integration tests for the zc binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use zc_chain::{sign_message, ChainEngine};
use zc_cli::keys::KeyPair;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn chain_path(&self) -> PathBuf {
        self.dir.path().join("chain.json")
    }

    fn key_path(&self) -> PathBuf {
        self.dir.path().join("keypair.json")
    }

    /// Run zc against this workspace's chain and key files.
    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_zc"))
            .arg("--chain")
            .arg(self.chain_path())
            .arg("--keys")
            .arg(self.key_path())
            .args(args)
            .env("NO_COLOR", "1")
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to execute zc")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn tamper_first_message(path: &Path) {
    let text = fs::read_to_string(path).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    doc["entries"][0]["message"] = serde_json::json!("TAMPERED");
    fs::write(path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
}

#[test]
fn test_keygen_writes_keypair() {
    let ws = Workspace::new();
    let output = ws.run(&["keygen"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Keypair generated"));

    let keypair = KeyPair::load(ws.key_path()).unwrap();
    assert!(stdout(&output).contains(&keypair.public_hex()));
}

#[test]
fn test_keygen_refuses_to_overwrite() {
    let ws = Workspace::new();
    assert!(ws.run(&["keygen"]).status.success());
    let original = KeyPair::load(ws.key_path()).unwrap();

    assert!(!ws.run(&["keygen"]).status.success());
    assert_eq!(
        KeyPair::load(ws.key_path()).unwrap().public_key,
        original.public_key
    );

    assert!(ws.run(&["keygen", "--force"]).status.success());
    assert_ne!(
        KeyPair::load(ws.key_path()).unwrap().public_key,
        original.public_key
    );
}

#[test]
fn test_log_without_keypair_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["log", "hello"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("zc keygen"));
}

#[test]
fn test_log_then_verify_chain() {
    let ws = Workspace::new();
    assert!(ws.run(&["keygen"]).status.success());

    let output = ws.run(&["log", "service started"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Log entry added to chain"));
    assert!(ws.run(&["log", "service stopped"]).status.success());

    let output = ws.run(&["chain-verify", "--signatures"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Hash chain structure valid"));
    assert!(out.contains("2 signatures verified"));
    assert!(out.contains("VALID"));

    let chain = ChainEngine::open(ws.chain_path()).unwrap();
    let entries = chain.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].prev_hash, "0");
    assert!(entries[0].metadata.contains_key("user"));
    assert!(entries[0].metadata.contains_key("hostname"));
}

#[test]
fn test_chain_verify_detects_tampering() {
    let ws = Workspace::new();
    assert!(ws.run(&["keygen"]).status.success());
    assert!(ws.run(&["log", "first"]).status.success());
    assert!(ws.run(&["log", "second"]).status.success());

    tamper_first_message(&ws.chain_path());

    let output = ws.run(&["chain-verify"]);
    assert!(!output.status.success());
    let out = stdout(&output);
    assert!(out.contains("hash mismatch at 0"));
    assert!(!out.contains("broken link"));
    assert!(out.contains("INVALID"));
}

#[test]
fn test_verify_signature_command() {
    let ws = Workspace::new();
    assert!(ws.run(&["keygen"]).status.success());
    let keypair = KeyPair::load(ws.key_path()).unwrap();
    let signature = sign_message(&keypair.private_key, b"deploy v2");

    let output = ws.run(&["verify", "deploy v2", &signature]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Signature valid"));

    let output = ws.run(&["verify", "deploy v3", &signature]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("Signature invalid"));

    let output = ws.run(&["verify", "deploy v2", "not-hex"]);
    assert!(!output.status.success());

    let other = KeyPair::generate();
    let output = ws.run(&[
        "verify",
        "deploy v2",
        &signature,
        "--pubkey",
        &other.public_hex(),
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_chain_stats_and_export() {
    let ws = Workspace::new();
    assert!(ws.run(&["keygen"]).status.success());

    let output = ws.run(&["chain-stats"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Entries: 0"));

    assert!(ws.run(&["log", "one"]).status.success());
    assert!(ws.run(&["log", "two"]).status.success());

    let output = ws.run(&["chain-stats"]);
    let out = stdout(&output);
    assert!(out.contains("Entries: 2"));
    assert!(out.contains("First Entry"));

    let output = ws.run(&["chain-export"]);
    assert!(output.status.success());
    let exported: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let entries = exported.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["message"], "two");
    assert_eq!(entries[1]["prev_hash"], entries[0]["current_hash"]);
}

#[test]
fn test_chain_show() {
    let ws = Workspace::new();
    let output = ws.run(&["chain-show"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Chain is empty"));

    assert!(ws.run(&["keygen"]).status.success());
    for message in ["alpha", "beta", "gamma"] {
        assert!(ws.run(&["log", message]).status.success());
    }

    let output = ws.run(&["chain-show", "--offset", "1", "--limit", "1"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Entry 1"));
    assert!(out.contains("beta"));
    assert!(!out.contains("alpha"));
    assert!(!out.contains("gamma"));
}

#[test]
fn test_config_file_supplies_paths() {
    let dir = TempDir::new().unwrap();
    let chain_path = dir.path().join("from-config.json");
    let key_path = dir.path().join("from-config-keys.json");
    let config_path = dir.path().join("zc.toml");
    fs::write(
        &config_path,
        format!(
            "chain_path = {:?}\nkey_file = {:?}\n",
            chain_path.display().to_string(),
            key_path.display().to_string()
        ),
    )
    .unwrap();

    let run = |args: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_zc"))
            .arg("--config")
            .arg(&config_path)
            .args(args)
            .env("NO_COLOR", "1")
            .env("HOME", dir.path())
            .output()
            .expect("failed to execute zc")
    };

    assert!(run(&["keygen"]).status.success());
    assert!(run(&["log", "configured"]).status.success());

    assert!(key_path.exists());
    let chain = ChainEngine::open(&chain_path).unwrap();
    assert_eq!(chain.get_entry(0).unwrap().message, "configured");
}

#[test]
fn test_corrupted_chain_file_fails() {
    let ws = Workspace::new();
    fs::write(ws.chain_path(), "{ not json").unwrap();

    let output = ws.run(&["chain-verify"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load chain"));
}
