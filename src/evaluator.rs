use anyhow::Result;
use ethers_core::types::{Address, U256};
use tracing::debug;

use crate::chain::VaultReader;
use crate::domain::{LiquidityCheck, LiquidityMode, LiquidityReading};
use crate::utils::to_human;

/// Decides whether `target` is reachable, preferring the owner-aware reading.
///
/// A failing `maxWithdraw` counts as zero and falls through to the raw vault
/// balance. Only a failing balance read is returned as an error.
pub async fn evaluate<R>(
    reader: &R,
    depositor: Option<Address>,
    target: U256,
    decimals: u8,
) -> Result<LiquidityCheck>
where
    R: VaultReader + ?Sized,
{
    let withdrawable = match depositor {
        Some(owner) => match reader.max_withdraw(owner).await {
            Ok(amount) => amount,
            Err(e) => {
                debug!("maxWithdraw unavailable, falling back to vault balance: {e:#}");
                U256::zero()
            }
        },
        None => U256::zero(),
    };

    if withdrawable >= target {
        return Ok(LiquidityCheck {
            hit: true,
            human_amount: to_human(withdrawable, decimals),
            mode: LiquidityMode::Owner,
            reading: LiquidityReading {
                withdrawable,
                vault_balance: None,
            },
        });
    }

    let balance = reader.vault_balance().await?;
    Ok(LiquidityCheck {
        hit: balance >= target,
        human_amount: to_human(balance, decimals),
        mode: LiquidityMode::Balance,
        reading: LiquidityReading {
            withdrawable,
            vault_balance: Some(balance),
        },
    })
}
