use std::fmt;

use ethers_core::types::{Address, U256};

/// Which path observed a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Push,
    Poll,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerSource::Push => f.write_str("Transfer event"),
            TriggerSource::Poll => f.write_str("poll"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    pub source: TriggerSource,
}

/// The most recent qualifying transfer, as surfaced in reminder text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDetails {
    pub amount: String,
    pub from: Address,
    pub to: Address,
}

/// Point-in-time chain readings behind one evaluation. The vault balance is
/// only read when the owner-aware amount falls short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityReading {
    pub withdrawable: U256,
    pub vault_balance: Option<U256>,
}

/// How a liquidity hit was established. `Balance` only proves tokens sit in the
/// vault, not that the depositor may withdraw them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityMode {
    Owner,
    Balance,
}

impl fmt::Display for LiquidityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiquidityMode::Owner => f.write_str("owner"),
            LiquidityMode::Balance => f.write_str("balance"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityCheck {
    pub hit: bool,
    pub human_amount: String,
    pub mode: LiquidityMode,
    pub reading: LiquidityReading,
}
