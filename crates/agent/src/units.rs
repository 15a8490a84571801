//! Amount parsing and formatting.
//!
//! Amounts are integers in wei. The CLI also accepts decimal ether with an
//! `eth` suffix, e.g. `0.25eth`.

use anyhow::{bail, Context, Result};
use merchfund_common::Amount;

const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;
const ETH_DECIMALS: usize = 18;

pub fn parse_amount(s: &str) -> Result<Amount> {
    let s = s.trim().to_ascii_lowercase();
    let eth = s
        .strip_suffix("ether")
        .or_else(|| s.strip_suffix("eth"))
        .map(str::trim);

    match eth {
        None => s.parse::<Amount>().with_context(|| format!("invalid amount '{}'", s)),
        Some(decimal) => parse_eth(decimal),
    }
}

fn parse_eth(s: &str) -> Result<Amount> {
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        bail!("invalid amount '{}eth'", s);
    }
    if frac.len() > ETH_DECIMALS {
        bail!("more than {} decimals in '{}'", ETH_DECIMALS, s);
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().with_context(|| format!("invalid amount '{}eth'", s))?
    };
    let frac_wei: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = ETH_DECIMALS);
        padded.parse().with_context(|| format!("invalid amount '{}eth'", s))?
    };
    whole
        .checked_mul(WEI_PER_ETH)
        .and_then(|w| w.checked_add(frac_wei))
        .with_context(|| format!("amount '{}eth' overflows", s))
}

/// Render wei as decimal ether without trailing zeros.
pub fn format_eth(wei: Amount) -> String {
    let whole = wei / WEI_PER_ETH;
    let frac = wei % WEI_PER_ETH;
    if frac == 0 {
        return format!("{} ETH", whole);
    }
    let frac = format!("{:018}", frac);
    format!("{}.{} ETH", whole, frac.trim_end_matches('0'))
}
