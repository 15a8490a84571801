//! # Revert Translation
//!
//! Pure mapping from raw revert data to an [`ErrorKind`].
//!
//! ## Rule Order
//!
//! 1. Selector rules: exact 4-byte equality. Candidates are the revert
//!    bytes at each nesting level (outermost first), then `0x` tokens in
//!    the messages that are exactly 8 hex digits, or longer revert data
//!    right after `signature:` / `data:`.
//! 2. Keyword rules: case-insensitive substring search over `message`,
//!    `short_message` and every nested cause message.
//! 3. Otherwise `Unknown` with the original message.
//!
//! First match wins. Selector rules always run before keyword rules, so a
//! selector hit cannot be overridden by message text.

use merchfund_chain::{ChainError, RevertData};

use crate::errors::ErrorKind;

/// Custom error selectors of the marketplace contracts.
pub const SELECTOR_RULES: &[([u8; 4], ErrorKind)] = &[
    ([0x2c, 0x06, 0x7c, 0xd7], ErrorKind::CampaignInactive),
    ([0xae, 0x92, 0x13, 0x57], ErrorKind::CampaignNotFound),
    ([0x1f, 0x2a, 0x20, 0x05], ErrorKind::TransferFailed),
    ([0x84, 0x56, 0xcb, 0x59], ErrorKind::ReentrancyBlocked),
];

/// Lower-case keywords, evaluated in order.
pub const KEYWORD_RULES: &[(&[&str], ErrorKind)] = &[
    (
        &["campaign inactive", "not active", "campaigninactive"],
        ErrorKind::CampaignInactive,
    ),
    (
        &["campaign not found", "campaignnotfound", "does not exist"],
        ErrorKind::CampaignNotFound,
    ),
    (&["transfer failed", "transferfailed"], ErrorKind::TransferFailed),
    (&["reentrancy", "reentrant"], ErrorKind::ReentrancyBlocked),
    (
        &["zero amount", "amount must be greater than zero", "zeroamount"],
        ErrorKind::ZeroAmount,
    ),
];

/// Classify a revert.
pub fn translate(revert: &RevertData) -> ErrorKind {
    if let Some(kind) = match_selector(revert) {
        return kind;
    }
    if let Some(kind) = match_keywords(revert) {
        return kind;
    }
    ErrorKind::Unknown(original_message(revert))
}

/// Classify any chain error. Errors without revert data are `Unknown`.
pub fn translate_chain_error(err: &ChainError) -> ErrorKind {
    match err.revert() {
        Some(revert) => translate(revert),
        None => ErrorKind::Unknown(err.to_string()),
    }
}

fn lookup_selector(selector: [u8; 4]) -> Option<ErrorKind> {
    SELECTOR_RULES
        .iter()
        .find(|(s, _)| *s == selector)
        .map(|(_, kind)| kind.clone())
}

fn messages(revert: &RevertData) -> impl Iterator<Item = &str> {
    revert.levels().flat_map(|level| {
        std::iter::once(level.message.as_str()).chain(level.short_message.as_deref())
    })
}

/// Labels after which a longer hex blob is revert data.
const DATA_LABELS: &[&str] = &["signature:", "data:"];

/// Selector candidates in free text.
///
/// A `0x` token counts when it is exactly 8 hex digits long, or when it is
/// longer and directly follows one of [`DATA_LABELS`]. Addresses and
/// transaction hashes elsewhere in the message are skipped.
fn selector_tokens(text: &str) -> Vec<[u8; 4]> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i + 2 <= bytes.len() {
        let at_boundary = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
        let is_prefix = bytes[i] == b'0' && matches!(bytes.get(i + 1), Some(b'x' | b'X'));
        if !(at_boundary && is_prefix) {
            i += 1;
            continue;
        }

        let digits = bytes[i + 2..]
            .iter()
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        let end = i + 2 + digits;
        let ends_token = bytes.get(end).map_or(true, |b| !b.is_ascii_alphanumeric());
        let labelled = || {
            let before = text[..i].trim_end().to_ascii_lowercase();
            DATA_LABELS.iter().any(|label| before.ends_with(label))
        };

        if ends_token && (digits == 8 || (digits > 8 && labelled())) {
            let mut sel = [0u8; 4];
            if hex::decode_to_slice(&text[i + 2..i + 10], &mut sel).is_ok() {
                out.push(sel);
            }
        }
        i = end.max(i + 1);
    }
    out
}

fn match_selector(revert: &RevertData) -> Option<ErrorKind> {
    let from_data = revert.levels().filter_map(RevertData::selector);
    let from_text = messages(revert).flat_map(selector_tokens);
    from_data.chain(from_text).find_map(lookup_selector)
}

fn match_keywords(revert: &RevertData) -> Option<ErrorKind> {
    let haystacks: Vec<String> = messages(revert).map(str::to_lowercase).collect();
    KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| {
            haystacks
                .iter()
                .any(|h| keywords.iter().any(|k| h.contains(k)))
        })
        .map(|(_, kind)| kind.clone())
}

fn original_message(revert: &RevertData) -> String {
    if !revert.message.is_empty() {
        return revert.message.clone();
    }
    revert
        .levels()
        .find_map(|l| l.short_message.clone().or_else(|| (!l.message.is_empty()).then(|| l.message.clone())))
        .unwrap_or_else(|| "unknown error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_in_nested_cause() {
        let revert = RevertData::new("Internal JSON-RPC error.")
            .with_cause(RevertData::new("reverted").with_data(vec![0x1f, 0x2a, 0x20, 0x05, 0, 0]));
        assert_eq!(translate(&revert), ErrorKind::TransferFailed);
    }

    #[test]
    fn selector_token_in_message() {
        let revert = RevertData::new(
            "The contract function \"donate\" reverted with the following signature:\n0x8456cb59",
        );
        assert_eq!(translate(&revert), ErrorKind::ReentrancyBlocked);
    }

    #[test]
    fn selector_beats_keywords() {
        let revert = RevertData::new("transfer failed").with_data(vec![0x2c, 0x06, 0x7c, 0xd7]);
        assert_eq!(translate(&revert), ErrorKind::CampaignInactive);
    }

    #[test]
    fn keyword_case_insensitive_in_short_message() {
        let revert = RevertData::new("execution reverted").with_short_message("Campaign Not Found");
        assert_eq!(translate(&revert), ErrorKind::CampaignNotFound);
    }

    #[test]
    fn keyword_in_cause_message() {
        let revert = RevertData::new("call failed")
            .with_cause(RevertData::new("Error: ZeroAmount()"));
        assert_eq!(translate(&revert), ErrorKind::ZeroAmount);
    }

    #[test]
    fn unknown_keeps_message() {
        let revert = RevertData::new("insufficient funds for gas * price + value");
        assert_eq!(
            translate(&revert),
            ErrorKind::Unknown("insufficient funds for gas * price + value".to_string())
        );
    }

    #[test]
    fn unrelated_hex_token_ignored() {
        let revert = RevertData::new("tx 0xdeadbeefcafe failed");
        assert!(matches!(translate(&revert), ErrorKind::Unknown(_)));
    }

    #[test]
    fn address_starting_with_selector_ignored() {
        let revert = RevertData::new(
            "sender 0x2c067cd7aa00000000000000000000000000beef has no code",
        );
        assert!(matches!(translate(&revert), ErrorKind::Unknown(_)));

        let tx = format!("replacement for 0xae921357{} underpriced", "0".repeat(56));
        assert!(matches!(translate(&RevertData::new(tx)), ErrorKind::Unknown(_)));
    }

    #[test]
    fn labelled_revert_data_uses_leading_selector() {
        let revert = RevertData::new(
            "execution reverted, data: 0x2c067cd70000000000000000000000000000000000000000000000000000000000000001",
        );
        assert_eq!(translate(&revert), ErrorKind::CampaignInactive);
    }

    #[test]
    fn selector_tokens_need_exact_width() {
        assert_eq!(selector_tokens("0x1f2a2005"), vec![[0x1f, 0x2a, 0x20, 0x05]]);
        assert_eq!(selector_tokens("(0x1f2a2005)"), vec![[0x1f, 0x2a, 0x20, 0x05]]);
        assert!(selector_tokens("0x1f2a200").is_empty());
        assert!(selector_tokens("0x1f2a2005ab").is_empty());
        assert!(selector_tokens("10x1f2a2005").is_empty());
    }

    #[test]
    fn non_revert_chain_errors_are_unknown() {
        let kind = translate_chain_error(&ChainError::NoSender);
        assert_eq!(kind, ErrorKind::Unknown("no sender account configured".to_string()));
    }
}
