use crate::application::engine::InitializeInput;
use crate::domain::asset::Symbol;
use crate::domain::identity::Identity;
use crate::error::Result;
use crate::infrastructure::asset_ledger::InMemoryAssetLedger;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Funds an identity holds at the asset ledger before any command runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Holding {
    pub owner: Identity,
    pub symbol: Symbol,
    pub amount: i64,
}

/// Everything needed to bring a ledger up: the initial roles, the custody
/// identity and the asset ledger's opening holdings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenesisConfig {
    pub admin: Identity,
    pub treasurer: Identity,
    pub fee_address: Identity,
    pub custody: Identity,
    pub symbols: BTreeSet<Symbol>,
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

impl GenesisConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn initialize_input(&self) -> InitializeInput {
        InitializeInput {
            admin: self.admin.clone(),
            treasurer: self.treasurer.clone(),
            fee_address: self.fee_address.clone(),
            symbols: self.symbols.clone(),
        }
    }

    /// An asset ledger holding custody at `custody` and seeded with `holdings`.
    pub async fn asset_ledger(&self) -> Result<InMemoryAssetLedger> {
        let ledger = InMemoryAssetLedger::new(self.custody.clone());
        for holding in &self.holdings {
            ledger
                .mint(&holding.owner, &holding.symbol, holding.amount)
                .await?;
        }
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GENESIS: &str = r#"{
        "admin": "admin",
        "treasurer": "treasurer",
        "fee_address": "fees",
        "custody": "custody",
        "symbols": ["USDT", "ELF"],
        "holdings": [{"owner": "alice", "symbol": "ELF", "amount": 1000}]
    }"#;

    #[tokio::test]
    async fn test_load_genesis() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GENESIS.as_bytes()).unwrap();

        let genesis = GenesisConfig::load(file.path()).unwrap();
        assert_eq!(genesis.admin, Identity::user("admin"));
        assert_eq!(genesis.initialize_input().symbols.len(), 2);

        let ledger = genesis.asset_ledger().await.unwrap();
        assert_eq!(
            ledger
                .balance_of(&Identity::user("alice"), &Symbol::new("ELF"))
                .await,
            1000
        );
    }

    #[test]
    fn test_holdings_default_to_empty() {
        let genesis: GenesisConfig = serde_json::from_str(
            r#"{"admin":"a","treasurer":"t","fee_address":"f","custody":"c","symbols":[]}"#,
        )
        .unwrap();
        assert!(genesis.holdings.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(GenesisConfig::load("/definitely/not/here.json").is_err());
    }
}
