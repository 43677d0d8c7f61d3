use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ethers_core::abi::{self, Token};
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, Bytes, Filter, Log, TransactionRequest, H256, U256};
use ethers_core::utils::id;
use ethers_providers::{Middleware, Provider, Ws};

use crate::domain::{TransferEvent, TriggerSource};

/// keccak256("Transfer(address,address,uint256)")
pub const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// Read-only view of the watched vault.
#[async_trait]
pub trait VaultReader: Send + Sync {
    /// Amount `owner` may withdraw right now. Vaults without the ERC-4626
    /// `maxWithdraw` entry point return an error here.
    async fn max_withdraw(&self, owner: Address) -> Result<U256>;

    /// Raw token balance held by the vault contract.
    async fn vault_balance(&self) -> Result<U256>;
}

pub struct EthersVault {
    provider: Arc<Provider<Ws>>,
    vault: Address,
    token: Address,
}

impl EthersVault {
    pub fn new(provider: Arc<Provider<Ws>>, vault: Address, token: Address) -> Self {
        Self {
            provider,
            vault,
            token,
        }
    }

    async fn call_u256(&self, to: Address, signature: &str, arg: Address) -> Result<U256> {
        let tx: TypedTransaction = TransactionRequest::new()
            .to(to)
            .data(encode_call(signature, arg))
            .into();
        let output = self
            .provider
            .call(&tx, None)
            .await
            .with_context(|| format!("eth_call {signature} on {to:#x} failed"))?;
        decode_u256(&output).ok_or_else(|| anyhow!("{signature} returned {} bytes", output.len()))
    }
}

#[async_trait]
impl VaultReader for EthersVault {
    async fn max_withdraw(&self, owner: Address) -> Result<U256> {
        self.call_u256(self.vault, "maxWithdraw(address)", owner).await
    }

    async fn vault_balance(&self) -> Result<U256> {
        self.call_u256(self.token, "balanceOf(address)", self.vault).await
    }
}

fn encode_call(signature: &str, arg: Address) -> Bytes {
    let mut data = id(signature).to_vec();
    data.extend(abi::encode(&[Token::Address(arg)]));
    data.into()
}

fn decode_u256(output: &[u8]) -> Option<U256> {
    if output.len() < 32 {
        return None;
    }
    Some(U256::from_big_endian(&output[..32]))
}

/// Log filter for every `Transfer` of the watched token.
pub fn transfer_filter(token: Address) -> Result<Filter> {
    let transfer_sig: H256 = TRANSFER_TOPIC.parse()?;
    Ok(Filter::new().address(token).topic0(transfer_sig))
}

/// Decodes an ERC-20 `Transfer` log. Returns `None` for logs that do not
/// carry indexed from/to topics and a 32-byte value.
pub fn decode_transfer(log: &Log) -> Option<TransferEvent> {
    if log.topics.len() < 3 {
        return None;
    }
    let from = topic_to_address(&log.topics[1]);
    let to = topic_to_address(&log.topics[2]);
    let amount = decode_u256(&log.data)?;

    Some(TransferEvent {
        from,
        to,
        amount,
        source: TriggerSource::Push,
    })
}

fn topic_to_address(topic: &H256) -> Address {
    Address::from_slice(&topic.as_bytes()[12..])
}
