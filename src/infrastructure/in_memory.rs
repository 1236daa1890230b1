use crate::domain::account::LedgerAccount;
use crate::domain::asset::Symbol;
use crate::domain::identity::Identity;
use crate::domain::organization::Organization;
use crate::domain::ports::{LedgerStore, StateChanges};
use crate::domain::roles::Roles;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct LedgerState {
    roles: Option<Roles>,
    memberships: HashMap<Identity, Identity>,
    organizations: HashMap<Identity, Organization>,
    accounts: HashMap<(Identity, Symbol), LedgerAccount>,
}

/// A thread-safe in-memory ledger store.
///
/// All state sits behind one `RwLock`, so a commit is applied under a single
/// write guard and readers never observe half of a change set.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn roles(&self) -> Result<Option<Roles>> {
        Ok(self.state.read().await.roles.clone())
    }

    async fn organization_of(&self, user: &Identity) -> Result<Option<Identity>> {
        Ok(self.state.read().await.memberships.get(user).cloned())
    }

    async fn organization(&self, address: &Identity) -> Result<Option<Organization>> {
        Ok(self.state.read().await.organizations.get(address).cloned())
    }

    async fn account(&self, owner: &Identity, symbol: &Symbol) -> Result<LedgerAccount> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .get(&(owner.clone(), symbol.clone()))
            .cloned()
            .unwrap_or_else(|| LedgerAccount::new(owner.clone(), symbol.clone())))
    }

    async fn accounts(&self) -> Result<Vec<LedgerAccount>> {
        Ok(self.state.read().await.accounts.values().cloned().collect())
    }

    async fn commit(&self, changes: StateChanges) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(roles) = changes.roles {
            state.roles = Some(roles);
        }
        for (user, organization) in changes.memberships {
            state.memberships.entry(user).or_insert(organization);
        }
        for organization in changes.organizations {
            state
                .organizations
                .insert(organization.address.clone(), organization);
        }
        for account in changes.accounts {
            state
                .accounts
                .insert((account.owner.clone(), account.symbol.clone()), account);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::InvocationId;

    #[tokio::test]
    async fn test_in_memory_account_defaults_to_zero() {
        let store = InMemoryLedgerStore::new();
        let account = store
            .account(&Identity::user("nobody"), &Symbol::new("ELF"))
            .await
            .unwrap();
        assert_eq!(account.balance, 0);
        assert_eq!(account.locked_balance, 0);
        assert!(store.accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_commit_applies_change_set() {
        let store = InMemoryLedgerStore::new();
        let alice = Identity::user("alice");
        let org = Organization::founded_by(alice.clone(), InvocationId::generate());
        let mut account = LedgerAccount::new(org.address.clone(), Symbol::new("ELF"));
        account.balance = 100;

        store
            .commit(StateChanges {
                memberships: vec![(alice.clone(), org.address.clone())],
                organizations: vec![org.clone()],
                accounts: vec![account.clone()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(
            store.organization_of(&alice).await.unwrap(),
            Some(org.address.clone())
        );
        assert_eq!(store.organization(&org.address).await.unwrap(), Some(org.clone()));
        assert_eq!(
            store
                .account(&org.address, &Symbol::new("ELF"))
                .await
                .unwrap(),
            account
        );
        assert!(store.roles().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_memberships_are_write_once() {
        let store = InMemoryLedgerStore::new();
        let alice = Identity::user("alice");
        let first = Identity::organization("first");
        let second = Identity::organization("second");

        for org in [&first, &second] {
            store
                .commit(StateChanges {
                    memberships: vec![(alice.clone(), org.clone())],
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        assert_eq!(store.organization_of(&alice).await.unwrap(), Some(first));
    }
}
