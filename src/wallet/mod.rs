use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use crate::crypto::sha256;

/// Generate a new secp256k1 keypair and return (priv_hex, pub_hex_compressed, address_hex).
/// The address is the hex of the compressed public key.
pub fn generate_keypair_hex() -> (String, String, String) {
    let secp = Secp256k1::new();
    let (sk, pk) = secp.generate_keypair(&mut OsRng);
    let sk_hex = hex::encode(sk.secret_bytes());
    let pk_hex = hex::encode(pk.serialize()); // compressed (33 bytes)
    let address = pk_hex.clone();
    (sk_hex, pk_hex, address)
}

/// Normalize an address (hex public key, compressed or not) to the
/// compressed lowercase form. Fails if it does not decode to a curve point.
pub fn pubkey_to_address_hex(pubkey_hex: &str) -> Result<String, &'static str> {
    let bytes = hex::decode(pubkey_hex).map_err(|_| "invalid pubkey hex")?;
    let pk = PublicKey::from_slice(&bytes).map_err(|_| "invalid pubkey bytes")?;
    Ok(hex::encode(pk.serialize()))
}

/// Sign `message` with a hex secret key. Returns a DER signature over
/// SHA-256(`message`), ready to go into a `TxIn` signature.
pub fn sign_message(secret_hex: &str, message: &[u8]) -> Result<Vec<u8>, &'static str> {
    let secp = Secp256k1::signing_only();
    let sk_bytes = hex::decode(secret_hex).map_err(|_| "invalid secret key hex")?;
    let sk = SecretKey::from_slice(&sk_bytes).map_err(|_| "invalid secret key bytes")?;
    let msg = Message::from_slice(&sha256(message)).map_err(|_| "invalid message length")?;
    Ok(secp.sign_ecdsa(&msg, &sk).serialize_der().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_address_normalizes_to_itself() {
        let (_sk, pk, address) = generate_keypair_hex();
        assert_eq!(pk, address);
        assert_eq!(pubkey_to_address_hex(&address).unwrap(), address);
    }

    #[test]
    fn rejects_garbage_keys() {
        assert!(pubkey_to_address_hex("zz").is_err());
        assert!(pubkey_to_address_hex("02abcd").is_err());
        assert!(sign_message("00", b"m").is_err());
    }
}
