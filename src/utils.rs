use anyhow::{anyhow, Result};
use ethers_core::types::U256;
use ethers_core::utils::parse_units;

/// Renders a fixed-point token amount as a decimal string without rounding.
///
/// Trailing zeros of the fractional part are stripped, and the separator is
/// dropped when nothing remains: `1500000` at 6 decimals is `"1.5"`, `1000000`
/// is `"1"`.
pub fn to_human(amount: U256, decimals: u8) -> String {
    let width = decimals as usize;
    let (whole, frac) = match U256::from(10u8).checked_pow(U256::from(decimals)) {
        Some(factor) => (amount / factor, amount % factor),
        // 10^decimals is past U256::MAX, so every digit is fractional
        None => (U256::zero(), amount),
    };

    if width == 0 {
        return whole.to_string();
    }

    let padded = format!("{:0>width$}", frac.to_string(), width = width);
    let trimmed = padded.trim_end_matches('0');
    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Parses a human decimal string such as `"8000"` or `"10.5"` into fixed-point units.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    if amount.is_empty() || amount.starts_with('-') {
        return Err(anyhow!("invalid token amount '{amount}'"));
    }
    if let Some((_, fraction)) = amount.split_once('.') {
        if fraction.len() > decimals as usize {
            return Err(anyhow!(
                "token amount '{amount}' has more than {decimals} decimal places"
            ));
        }
    }
    let parsed = parse_units(amount, decimals as u32)
        .map_err(|e| anyhow!("invalid token amount '{amount}': {e}"))?;
    Ok(parsed.into())
}

pub fn mask_url(url: &str) -> String {
    if let Some(scheme_end) = url.find("://") {
        let scheme = &url[..scheme_end + 3];
        let rest = &url[scheme_end + 3..];
        return match rest.find('/') {
            Some(host_end) => format!("{scheme}{}/***/", &rest[..host_end]),
            None => format!("{scheme}{rest}"),
        };
    }
    "***".to_string()
}
