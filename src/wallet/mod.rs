use rand::rngs::OsRng;
use secp256k1::{PublicKey, Secp256k1, SecretKey};

/// The miner's identity keypair, both sides hex-encoded. The public side
/// (compressed, 33 bytes) is the miner's name on the network: it keys ink
/// accounts, pixel ownership and block authorship.
#[derive(Debug, Clone)]
pub struct MinerKeys {
    pub private_key_hex: String,
    pub public_key_hex: String,
}

/// Generate a new secp256k1 keypair and return (priv_hex, pub_hex_compressed).
pub fn generate_keypair_hex() -> (String, String) {
    let secp = Secp256k1::new();
    let (sk, pk) = secp.generate_keypair(&mut OsRng);
    (hex::encode(sk.secret_bytes()), hex::encode(pk.serialize()))
}

/// Derive the compressed public key (hex) from a hex private key.
pub fn derive_public_key_hex(priv_hex: &str) -> Result<String, &'static str> {
    let bytes = hex::decode(priv_hex).map_err(|_| "invalid private key hex")?;
    let sk = SecretKey::from_slice(&bytes).map_err(|_| "invalid private key bytes")?;
    let secp = Secp256k1::new();
    let pk = PublicKey::from_secret_key(&secp, &sk);
    Ok(hex::encode(pk.serialize()))
}

/// Use the configured private key, or mint a fresh identity when none is
/// supplied (dev mode).
pub fn load_or_generate(priv_hex: Option<String>) -> Result<MinerKeys, &'static str> {
    match priv_hex {
        Some(private_key_hex) => {
            let public_key_hex = derive_public_key_hex(&private_key_hex)?;
            Ok(MinerKeys {
                private_key_hex,
                public_key_hex,
            })
        }
        None => {
            let (private_key_hex, public_key_hex) = generate_keypair_hex();
            Ok(MinerKeys {
                private_key_hex,
                public_key_hex,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_round_trip() {
        let (sk, pk) = generate_keypair_hex();
        assert_eq!(derive_public_key_hex(&sk).unwrap(), pk);
        assert_eq!(pk.len(), 66, "compressed public key is 33 bytes");
    }

    #[test]
    fn garbage_private_key_is_rejected() {
        assert!(derive_public_key_hex("not-hex").is_err());
        assert!(derive_public_key_hex("abcd").is_err());
    }

    #[test]
    fn load_or_generate_accepts_existing_key() {
        let (sk, pk) = generate_keypair_hex();
        let keys = load_or_generate(Some(sk.clone())).unwrap();
        assert_eq!(keys.private_key_hex, sk);
        assert_eq!(keys.public_key_hex, pk);
    }
}
