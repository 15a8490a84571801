//! `0x`-prefixed hex helpers for JSON-RPC payloads.
//!
//! Byte strings travel as `0x` + even-length hex, quantities as `0x` +
//! minimal hex (no leading zeros, `0x0` for zero).

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn encode_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode `0x`-prefixed (or bare) hex into bytes. `"0x"` decodes to empty.
pub fn decode_prefixed(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let body = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    hex::decode(body)
}

/// Encode an integer as a JSON-RPC quantity.
pub fn to_quantity(value: u128) -> String {
    format!("0x{:x}", value)
}

/// Parse a JSON-RPC quantity (`0x`-prefixed hex) or a plain decimal string.
pub fn parse_quantity(s: &str) -> Option<u128> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some("") => None,
        Some(body) => u128::from_str_radix(body, 16).ok(),
        None => s.parse::<u128>().ok(),
    }
}
