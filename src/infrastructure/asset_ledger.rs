use crate::domain::asset::{Amount, Symbol};
use crate::domain::identity::Identity;
use crate::domain::ports::AssetTransfer;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// An in-memory stand-in for the external token ledger.
///
/// Keeps holdings per (identity, symbol). `push` pays out of the custody
/// identity; any movement exceeding the source's holdings is refused with
/// `ExternalTransferFailed` and changes nothing.
#[derive(Clone)]
pub struct InMemoryAssetLedger {
    custody: Identity,
    holdings: Arc<RwLock<HashMap<(Identity, Symbol), i64>>>,
}

impl InMemoryAssetLedger {
    pub fn new(custody: Identity) -> Self {
        Self {
            custody,
            holdings: Arc::default(),
        }
    }

    /// Credits `owner` out of thin air. Used to seed holdings.
    pub async fn mint(&self, owner: &Identity, symbol: &Symbol, amount: i64) -> Result<()> {
        let amount = Amount::new(amount)?;
        let mut holdings = self.holdings.write().await;
        let entry = holdings
            .entry((owner.clone(), symbol.clone()))
            .or_default();
        *entry = entry
            .checked_add(amount.value())
            .ok_or(LedgerError::Overflow("minting holdings"))?;
        Ok(())
    }

    pub async fn balance_of(&self, owner: &Identity, symbol: &Symbol) -> i64 {
        self.holdings
            .read()
            .await
            .get(&(owner.clone(), symbol.clone()))
            .copied()
            .unwrap_or(0)
    }

    async fn transfer(
        &self,
        from: &Identity,
        to: &Identity,
        symbol: &Symbol,
        amount: Amount,
    ) -> Result<()> {
        let mut holdings = self.holdings.write().await;
        let from_key = (from.clone(), symbol.clone());
        let available = holdings.get(&from_key).copied().unwrap_or(0);
        if available < amount.value() {
            return Err(LedgerError::ExternalTransferFailed(format!(
                "{from} holds {available} {symbol}, cannot move {amount} to {to}"
            )));
        }
        if from == to {
            return Ok(());
        }
        let to_key = (to.clone(), symbol.clone());
        let credited = holdings
            .get(&to_key)
            .copied()
            .unwrap_or(0)
            .checked_add(amount.value())
            .ok_or_else(|| {
                LedgerError::ExternalTransferFailed(format!("{to} holdings of {symbol} overflow"))
            })?;
        holdings.insert(from_key, available - amount.value());
        holdings.insert(to_key, credited);
        debug!(from = %from, to = %to, symbol = %symbol, amount = amount.value(), "Assets moved");
        Ok(())
    }
}

#[async_trait]
impl AssetTransfer for InMemoryAssetLedger {
    async fn pull(
        &self,
        from: &Identity,
        symbol: &Symbol,
        amount: Amount,
        to: &Identity,
    ) -> Result<()> {
        self.transfer(from, to, symbol, amount).await
    }

    async fn push(&self, to: &Identity, symbol: &Symbol, amount: Amount) -> Result<()> {
        self.transfer(&self.custody, to, symbol, amount).await
    }
}
