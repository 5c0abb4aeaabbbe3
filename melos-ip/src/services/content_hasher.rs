//! Content hashing and identifier derivation
//!
//! Pure functions, no I/O. Token identifiers come in two forms:
//! - on-chain: `lowercase(contract_address):on_chain_id`
//! - synthetic (pre-mint): derived from a SHA-256 digest of the creator,
//!   media list and timestamp. The substring offsets and modulus below are
//!   load-bearing: downstream systems already hold identifiers produced this
//!   way, so the derivation must stay bit-exact.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over raw bytes, lowercase hex (64 chars)
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 over the serde_json serialization of a value
///
/// Canonicalization is serde_json's struct field declaration order. Hashes
/// are self-consistent within one producer; no cross-producer canonical JSON
/// form is enforced.
pub fn hash_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(hash_bytes(json.as_bytes()))
}

/// Media entry contributing to a synthetic token identifier
#[derive(Debug, Clone, Serialize)]
pub struct TokenSeedMedia {
    pub media_id: String,
    pub url: String,
}

#[derive(Serialize)]
struct TokenSeed<'a> {
    creator: &'a str,
    media: &'a [TokenSeedMedia],
    timestamp: u64,
}

/// Token identifier for an asset already minted on chain
pub fn onchain_token_id(contract_address: &str, on_chain_id: u64) -> String {
    format!("{}:{}", contract_address.to_lowercase(), on_chain_id)
}

/// Synthetic token identifier for an off-chain, pre-mint asset
///
/// `h = sha256(json({creator, media, timestamp}))` as lowercase hex.
/// Address: `"0x" + h[0..40]`. Numeric suffix: `h[40..48]` parsed as a
/// 32-bit hex integer, reduced to `[1, 999999]`.
pub fn synthetic_token_id(
    creator: &str,
    media: &[TokenSeedMedia],
    timestamp: u64,
) -> Result<String, serde_json::Error> {
    let seed = TokenSeed {
        creator,
        media,
        timestamp,
    };
    let json = serde_json::to_string(&seed)?;
    let digest = Sha256::digest(json.as_bytes());
    let hex = format!("{:x}", digest);

    let address = format!("0x{}", &hex[..40]);
    // hex[40..48] big-endian, i.e. digest bytes 20..24
    let window = u32::from_be_bytes([digest[20], digest[21], digest[22], digest[23]]);
    let n = window % 999_999 + 1;

    Ok(format!("{}:{}", address, n))
}

/// Transaction hash synthesized for pre-mint registration submissions
pub fn synthetic_tx_hash(
    creator: &str,
    media: &[TokenSeedMedia],
    timestamp: u64,
) -> Result<String, serde_json::Error> {
    let seed = TokenSeed {
        creator,
        media,
        timestamp,
    };
    Ok(format!("0x{}", hash_json(&seed)?))
}
