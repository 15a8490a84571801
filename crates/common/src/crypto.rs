//! Keccak-256 helpers: digests, function selectors, event topics.
//!
//! The ledger identifies functions and custom errors by the first four
//! bytes of `keccak256(signature)` and events by the full digest.

use sha3::{Digest, Keccak256};

/// Keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();

    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Four-byte selector of a canonical signature such as `transfer(address,uint256)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}
