//! Ed25519 signature generation and verification.
//!
//! Keys and signatures travel as lowercase hex strings. Verification never
//! errors: malformed input simply fails to verify.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::types::Entry;

/// Generate a new Ed25519 keypair.
///
/// Returns (private_key_bytes, public_key_bytes).
pub fn keygen() -> ([u8; 32], [u8; 32]) {
    let private_bytes: [u8; 32] = rand::random();
    let public_bytes = public_key_for(&private_bytes);
    (private_bytes, public_bytes)
}

/// Derive the public key for a 32-byte private key.
pub fn public_key_for(private_key: &[u8; 32]) -> [u8; 32] {
    SigningKey::from_bytes(private_key).verifying_key().to_bytes()
}

/// Sign `message` and return the hex-encoded signature.
pub fn sign_message(private_key: &[u8; 32], message: &[u8]) -> String {
    let signing_key = SigningKey::from_bytes(private_key);
    hex::encode(signing_key.sign(message).to_bytes())
}

/// Verify a hex-encoded signature over `message` with a hex-encoded key.
///
/// # Returns
/// `true` if the signature is valid. Bad hex, a key or signature of the
/// wrong length, and an invalid curve point all yield `false`.
pub fn verify_signature(pubkey_hex: &str, message: &[u8], signature_hex: &str) -> bool {
    let Some(key_bytes) = decode_fixed::<32>(pubkey_hex) else {
        return false;
    };
    let Some(sig_bytes) = decode_fixed::<64>(signature_hex) else {
        return false;
    };

    let verifying_key = match VerifyingKey::from_bytes(&key_bytes) {
        Ok(key) => key,
        Err(_) => return false,
    };
    let signature = Signature::from_bytes(&sig_bytes);

    verifying_key.verify(message, &signature).is_ok()
}

/// Check an entry's signature against its own `pubkey` and `message`.
pub fn verify_entry_signature(entry: &Entry) -> bool {
    verify_signature(&entry.pubkey, entry.message.as_bytes(), &entry.signature)
}

fn decode_fixed<const N: usize>(hex_str: &str) -> Option<[u8; N]> {
    let bytes = hex::decode(hex_str).ok()?;
    bytes.try_into().ok()
}
