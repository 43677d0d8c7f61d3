use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use ethers_core::types::{Address, U256};

use crate::utils::parse_amount;

const LOCAL_NODE_WS: &str = "ws://127.0.0.1:8545";

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub ws_rpc_url: String,
    pub vault: Address,
    pub market: Option<Address>,
    pub token: Address,
    pub depositor: Option<Address>,
    pub target_amount: U256,
    pub asset_decimals: u8,
    pub poll_interval: Duration,
    pub min_transfer_amount: U256,
    pub watch_wallet: Option<Address>,
    pub reminder_interval: Duration,
    pub reminder_cap: u32,
    pub debounce_window: Duration,
    pub one_shot: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl WatchConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let ws_rpc_url = if parse_flag(get("USE_LOCAL_NODE").as_deref()) {
            LOCAL_NODE_WS.to_string()
        } else {
            get("WS_RPC_URL").ok_or_else(|| anyhow!("WS_RPC_URL must be set in .env"))?
        };

        let vault = required_address(get("VAULT"), "VAULT")?;
        let token = required_address(get("TOKEN").or_else(|| get("USDC")), "USDC")?;
        let market = optional_address(get("MARKET"), "MARKET")?;
        let depositor = optional_address(get("DEPOSITOR"), "DEPOSITOR")?;
        let watch_wallet = optional_address(get("WATCH_WALLET"), "WATCH_WALLET")?;

        let asset_decimals: u8 = parse_number(get("ASSET_DECIMALS"), "ASSET_DECIMALS", 6)?;
        let target_raw = get("TARGET_AMOUNT_DEC").unwrap_or_else(|| "8000".to_string());
        let target_amount = parse_amount(&target_raw, asset_decimals)
            .context("TARGET_AMOUNT_DEC is not a valid amount")?;
        let min_raw = get("MIN_TRANSFER_AMOUNT_DEC").unwrap_or_else(|| "10".to_string());
        let min_transfer_amount = parse_amount(&min_raw, asset_decimals)
            .context("MIN_TRANSFER_AMOUNT_DEC is not a valid amount")?;

        let poll_ms: u64 = parse_number(get("POLL_INTERVAL_MS"), "POLL_INTERVAL_MS", 3_600_000)?;
        let reminder_secs: u64 = parse_number(get("SPAM_INTERVAL_SEC"), "SPAM_INTERVAL_SEC", 10)?;
        let reminder_cap: u32 = parse_number(get("MAX_SPAM_COUNT"), "MAX_SPAM_COUNT", 5)?;
        let debounce_ms: u64 = parse_number(get("DEBOUNCE_MS"), "DEBOUNCE_MS", 2_000)?;

        if poll_ms == 0 {
            return Err(anyhow!("POLL_INTERVAL_MS must be greater than zero"));
        }
        if reminder_secs == 0 {
            return Err(anyhow!("SPAM_INTERVAL_SEC must be greater than zero"));
        }

        Ok(Self {
            ws_rpc_url,
            vault,
            market,
            token,
            depositor,
            target_amount,
            asset_decimals,
            poll_interval: Duration::from_millis(poll_ms),
            min_transfer_amount,
            watch_wallet,
            reminder_interval: Duration::from_secs(reminder_secs),
            reminder_cap,
            debounce_window: Duration::from_millis(debounce_ms),
            one_shot: parse_flag(get("ONE_SHOT").as_deref()),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
        })
    }
}

fn required_address(raw: Option<String>, key: &str) -> Result<Address> {
    let raw = raw.ok_or_else(|| anyhow!("{key} must be set in .env"))?;
    parse_address(&raw, key)
}

fn optional_address(raw: Option<String>, key: &str) -> Result<Option<Address>> {
    raw.map(|r| parse_address(&r, key)).transpose()
}

fn parse_address(raw: &str, key: &str) -> Result<Address> {
    raw.parse::<Address>()
        .map_err(|e| anyhow!("{key} is not a valid address '{raw}': {e}"))
}

fn parse_number<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .parse()
            .map_err(|e| anyhow!("{key} has invalid value '{value}': {e}")),
        None => Ok(default),
    }
}

fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false)
}
