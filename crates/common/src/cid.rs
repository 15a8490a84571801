//! Content identifier helpers.
//! The file registry anchors `keccak256(cid)`; the relayer reports that
//! value back as `fileHash`.

use crate::crypto::keccak256;

/// Upper bound on accepted CID text length.
pub const MAX_CID_LEN: usize = 128;

/// `0x`-prefixed Keccak-256 of the CID text.
pub fn file_hash_hex(cid: &str) -> String {
    format!("0x{}", hex::encode(keccak256(cid.as_bytes())))
}

/// Short prefix form useful for logging (first 12 chars).
pub fn short_cid(cid: &str) -> &str {
    cid.get(0..12).unwrap_or(cid)
}

/// Structural check: non-empty, ASCII alphanumeric (base58btc / base32), bounded length.
pub fn is_valid_cid(cid: &str) -> bool {
    !cid.is_empty()
        && cid.len() <= MAX_CID_LEN
        && cid.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CID_V0: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
    const CID_V1: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

    #[test]
    fn test_file_hash_deterministic() {
        let h1 = file_hash_hex(CID_V0);
        let h2 = file_hash_hex(CID_V0);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 66);
        assert_ne!(h1, file_hash_hex(CID_V1));
    }

    #[test]
    fn test_short_cid() {
        assert_eq!(short_cid(CID_V0), "QmYwAPJzv5CZ");
        assert_eq!(short_cid("abc"), "abc");
    }

    #[test]
    fn test_cid_validation() {
        assert!(is_valid_cid(CID_V0));
        assert!(is_valid_cid(CID_V1));
        assert!(!is_valid_cid(""));
        assert!(!is_valid_cid("Qm abc"));
        assert!(!is_valid_cid("../etc/passwd"));
        assert!(!is_valid_cid(&"a".repeat(MAX_CID_LEN + 1)));
    }
}
