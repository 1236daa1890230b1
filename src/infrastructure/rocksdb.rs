use crate::domain::account::LedgerAccount;
use crate::domain::asset::Symbol;
use crate::domain::identity::Identity;
use crate::domain::organization::Organization;
use crate::domain::ports::{LedgerStore, StateChanges};
use crate::domain::roles::Roles;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the roles singleton.
pub const CF_ROLES: &str = "roles";
/// Column Family mapping users to their organization.
pub const CF_MEMBERSHIPS: &str = "memberships";
/// Column Family for organization records.
pub const CF_ORGANIZATIONS: &str = "organizations";
/// Column Family for per-(owner, symbol) balance records.
pub const CF_ACCOUNTS: &str = "accounts";

const ROLES_KEY: &[u8] = b"roles";

/// A persistent ledger store backed by RocksDB.
///
/// Each kind of record lives in its own Column Family, values are JSON. A
/// commit is written as one `WriteBatch`, so a change set lands entirely or
/// not at all.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path`, creating any missing
    /// column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ROLES, CF_MEMBERSHIPS, CF_ORGANIZATIONS, CF_ACCOUNTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::Internal(format!("{name} column family not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn stage<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf: &str,
        key: &[u8],
        value: &T,
    ) -> Result<()> {
        batch.put_cf(self.cf(cf)?, key, serde_json::to_vec(value)?);
        Ok(())
    }
}

fn account_key(owner: &Identity, symbol: &Symbol) -> Vec<u8> {
    format!("{owner}\0{symbol}").into_bytes()
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn roles(&self) -> Result<Option<Roles>> {
        self.read(CF_ROLES, ROLES_KEY)
    }

    async fn organization_of(&self, user: &Identity) -> Result<Option<Identity>> {
        self.read(CF_MEMBERSHIPS, user.to_string().as_bytes())
    }

    async fn organization(&self, address: &Identity) -> Result<Option<Organization>> {
        self.read(CF_ORGANIZATIONS, address.to_string().as_bytes())
    }

    async fn account(&self, owner: &Identity, symbol: &Symbol) -> Result<LedgerAccount> {
        Ok(self
            .read(CF_ACCOUNTS, &account_key(owner, symbol))?
            .unwrap_or_else(|| LedgerAccount::new(owner.clone(), symbol.clone())))
    }

    async fn accounts(&self) -> Result<Vec<LedgerAccount>> {
        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(self.cf(CF_ACCOUNTS)?, IteratorMode::Start) {
            let (_key, value) = item?;
            accounts.push(serde_json::from_slice(&value)?);
        }
        Ok(accounts)
    }

    async fn commit(&self, changes: StateChanges) -> Result<()> {
        // Write-once: an existing mapping wins.
        let mut memberships = Vec::with_capacity(changes.memberships.len());
        for (user, organization) in &changes.memberships {
            if self.organization_of(user).await?.is_none() {
                memberships.push((user, organization));
            }
        }

        let mut batch = WriteBatch::default();
        if let Some(roles) = &changes.roles {
            self.stage(&mut batch, CF_ROLES, ROLES_KEY, roles)?;
        }
        for (user, organization) in memberships {
            self.stage(
                &mut batch,
                CF_MEMBERSHIPS,
                user.to_string().as_bytes(),
                organization,
            )?;
        }
        for organization in &changes.organizations {
            self.stage(
                &mut batch,
                CF_ORGANIZATIONS,
                organization.address.to_string().as_bytes(),
                organization,
            )?;
        }
        for account in &changes.accounts {
            self.stage(
                &mut batch,
                CF_ACCOUNTS,
                &account_key(&account.owner, &account.symbol),
                account,
            )?;
        }
        self.db.write(batch)?;
        Ok(())
    }
}
