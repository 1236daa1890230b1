use super::account::LedgerAccount;
use super::asset::{Amount, Symbol};
use super::event::LedgerEvent;
use super::identity::Identity;
use super::organization::Organization;
use super::roles::Roles;
use crate::error::Result;
use async_trait::async_trait;

/// Every write produced by one invocation.
///
/// Stores apply a change set all-or-nothing, which is what makes an invocation
/// atomic: the engine stages its writes here and commits once, after the
/// external transfer has succeeded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateChanges {
    pub roles: Option<Roles>,
    /// `(user, organization)` pairs. Write-once per user.
    pub memberships: Vec<(Identity, Identity)>,
    pub organizations: Vec<Organization>,
    pub accounts: Vec<LedgerAccount>,
}

impl StateChanges {
    pub fn is_empty(&self) -> bool {
        self.roles.is_none()
            && self.memberships.is_empty()
            && self.organizations.is_empty()
            && self.accounts.is_empty()
    }
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn roles(&self) -> Result<Option<Roles>>;
    /// The organization `user` deposits into, if any.
    async fn organization_of(&self, user: &Identity) -> Result<Option<Identity>>;
    async fn organization(&self, address: &Identity) -> Result<Option<Organization>>;
    /// The record for `(owner, symbol)`; a zeroed record if none was stored.
    async fn account(&self, owner: &Identity, symbol: &Symbol) -> Result<LedgerAccount>;
    async fn accounts(&self) -> Result<Vec<LedgerAccount>>;
    async fn commit(&self, changes: StateChanges) -> Result<()>;
}

/// The external asset ledger funds actually move on.
#[async_trait]
pub trait AssetTransfer: Send + Sync {
    /// Moves `amount` from `from` to `to`, on the caller's behalf.
    async fn pull(&self, from: &Identity, symbol: &Symbol, amount: Amount, to: &Identity)
    -> Result<()>;
    /// Pays `amount` out of custody to `to`.
    async fn push(&self, to: &Identity, symbol: &Symbol, amount: Amount) -> Result<()>;
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: LedgerEvent) -> Result<()>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type AssetTransferBox = Box<dyn AssetTransfer>;
pub type EventSinkBox = Box<dyn EventSink>;
