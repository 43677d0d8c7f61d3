//! Operator-facing alert text. All messages use Telegram Markdown.

use ethers_core::types::Address;

use crate::domain::{LiquidityCheck, LiquidityMode, TransferDetails, TriggerSource};

pub fn liquidity_alert(vault: Address, check: &LiquidityCheck, trigger: TriggerSource) -> String {
    match check.mode {
        LiquidityMode::Owner => format!(
            "🚨 *Liquidity Available* 🚨\nVault: `{vault:#x}`\nAvailable for your depositor: *{} USDC*\nTrigger: {trigger}\n\nWithdraw quickly: call `withdraw(...)` from your depositor EOA.",
            check.human_amount
        ),
        LiquidityMode::Balance => format!(
            "🚨 *Liquidity Available (vault balance)* 🚨\nVault: `{vault:#x}`\nVault USDC balance: *{} USDC*\n(But confirm maxWithdraw(owner) before withdrawing)\nTrigger: {trigger}",
            check.human_amount
        ),
    }
}

/// `label` names the destination, e.g. "Market Contract" or "Vault".
pub fn transfer_alert(label: &str, details: &TransferDetails, trigger: TriggerSource) -> String {
    format!(
        "_ALERT_\n🚨 _Transfer Detected_ 🚨\n{label}: `{:#x}`\nAmount: _{} USDC_\nFrom: `{:#x}`\nTrigger: {trigger}",
        details.to, details.amount, details.from
    )
}

pub fn wallet_activity(wallet: Address, human_amount: &str, from: Address) -> String {
    format!("🔔 Wallet {wallet:#x} transferred {human_amount} USDC (from: {from:#x})")
}

pub fn reminder(
    last_transfer: Option<&TransferDetails>,
    vault: Address,
    market: Option<Address>,
) -> String {
    match last_transfer {
        Some(details) => format!(
            "⏰ _Reminder_: Transfer detected - Amount: _{} USDC_ | From: `{:#x}` | To: `{:#x}`",
            details.amount, details.from, details.to
        ),
        None => {
            let market = market
                .map(|m| format!("{m:#x}"))
                .unwrap_or_else(|| "N/A".to_string());
            format!(
                "⏰ _Reminder_: Transfer detected for vault `{vault:#x}` or market `{market}`. Check for available liquidity."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LiquidityReading;
    use ethers_core::types::U256;

    fn vault() -> Address {
        Address::repeat_byte(0x11)
    }

    #[test]
    fn balance_alert_carries_the_weaker_warning() {
        let check = LiquidityCheck {
            hit: true,
            human_amount: "15000".to_string(),
            mode: LiquidityMode::Balance,
            reading: LiquidityReading {
                withdrawable: U256::zero(),
                vault_balance: Some(U256::from(15_000_000_000u64)),
            },
        };
        let text = liquidity_alert(vault(), &check, TriggerSource::Poll);
        assert!(text.contains("15000"));
        assert!(text.contains("0x1111111111111111111111111111111111111111"));
        assert!(text.contains("confirm maxWithdraw(owner)"));
        assert!(text.contains("Trigger: poll"));
    }

    #[test]
    fn owner_alert_mentions_depositor() {
        let check = LiquidityCheck {
            hit: true,
            human_amount: "9000.5".to_string(),
            mode: LiquidityMode::Owner,
            reading: LiquidityReading {
                withdrawable: U256::from(9_000_500_000u64),
                vault_balance: None,
            },
        };
        let text = liquidity_alert(vault(), &check, TriggerSource::Poll);
        assert!(text.contains("Available for your depositor: *9000.5 USDC*"));
        assert!(!text.contains("confirm maxWithdraw"));
    }

    #[test]
    fn reminder_prefers_transfer_details() {
        let details = TransferDetails {
            amount: "250".to_string(),
            from: Address::repeat_byte(0xaa),
            to: vault(),
        };
        let text = reminder(Some(&details), vault(), None);
        assert!(text.contains("Amount: _250 USDC_"));
        assert!(text.contains("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
    }

    #[test]
    fn generic_reminder_names_vault_and_market() {
        let text = reminder(None, vault(), None);
        assert!(text.contains("market `N/A`"));

        let text = reminder(None, vault(), Some(Address::repeat_byte(0x33)));
        assert!(text.contains("0x3333333333333333333333333333333333333333"));
        assert!(text.contains("Check for available liquidity"));
    }
}
