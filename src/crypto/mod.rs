//! Hashing and signature primitives shared by transactions and blocks.
//!
//! Everything here is a pure function: no state, no panics on bad input.

use secp256k1::{Message, PublicKey, Secp256k1, ecdsa::Signature};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest.
pub type Hash = String;

/// Sentinel used as `previous_hash` of the genesis block.
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// SHA-256 of raw bytes as a 32-byte array.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

/// SHA-256 of raw bytes, hex-encoded.
pub fn sha256_hex(bytes: &[u8]) -> Hash {
    hex::encode(sha256(bytes))
}

/// Canonical JSON of `value`: object keys sorted, no whitespace.
///
/// Going through `serde_json::Value` sorts map keys, so two logically equal
/// objects encode to the same bytes no matter how they were built.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    let value = serde_json::to_value(value).expect("ledger types always serialize");
    serde_json::to_vec(&value).expect("json value always serializes")
}

/// Content hash used for transaction ids and block hashes.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Hash {
    sha256_hex(&canonical_json(value))
}

/// True when the first `difficulty` hex digits of `hash` are all zero.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    hash.get(..difficulty as usize)
        .is_some_and(|prefix| prefix.bytes().all(|b| b == b'0'))
}

/// Verify an ECDSA signature over SHA-256(`message`) against `address`
/// (hex SEC1 public key). Signatures may be DER or 64-byte compact.
pub fn verify_signature(address: &str, message: &[u8], signature: &[u8]) -> bool {
    let Ok(key_bytes) = hex::decode(address) else {
        return false;
    };
    let Ok(public_key) = PublicKey::from_slice(&key_bytes) else {
        return false;
    };
    let Ok(mut signature) =
        Signature::from_der(signature).or_else(|_| Signature::from_compact(signature))
    else {
        return false;
    };
    signature.normalize_s();

    let Ok(digest) = Message::from_slice(&sha256(message)) else {
        return false;
    };
    Secp256k1::verification_only()
        .verify_ecdsa(&digest, &signature, &public_key)
        .is_ok()
}
