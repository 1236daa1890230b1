use crate::domain::event::LedgerEvent;
use crate::domain::identity::{Identity, Invocation};
use crate::domain::organization::Organization;
use crate::domain::ports::{LedgerStore, StateChanges};
use crate::error::{LedgerError, Result};
use tracing::debug;

/// Resolves which organization a user acts through.
pub struct OrganizationRegistry<'a> {
    store: &'a dyn LedgerStore,
}

impl<'a> OrganizationRegistry<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self { store }
    }

    /// The organization `user` owns, or `NoOrganization`.
    pub async fn lookup(&self, user: &Identity) -> Result<Identity> {
        self.store
            .organization_of(user)
            .await?
            .ok_or_else(|| LedgerError::NoOrganization(user.clone()))
    }

    /// Checks that `address` names an existing organization record.
    pub async fn require_existing(&self, address: &Identity) -> Result<Organization> {
        self.store
            .organization(address)
            .await?
            .ok_or_else(|| LedgerError::NoOrganization(address.clone()))
    }

    /// The sender's organization, creating it on first use.
    ///
    /// A new organization is only staged into `changes` and `events`; it
    /// exists once the caller commits them.
    pub async fn resolve_or_create(
        &self,
        invocation: &Invocation,
        changes: &mut StateChanges,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<Identity> {
        if let Some(address) = self.store.organization_of(&invocation.sender).await? {
            return Ok(address);
        }

        let organization = Organization::founded_by(invocation.sender.clone(), invocation.id);
        let address = organization.address.clone();
        debug!(
            user = %invocation.sender,
            organization = %address,
            invocation = %invocation.id,
            "Staging new organization"
        );

        changes
            .memberships
            .push((invocation.sender.clone(), address.clone()));
        events.push(LedgerEvent::OrganizationCreated {
            address: address.clone(),
            members: organization.members.clone(),
        });
        changes.organizations.push(organization);

        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryLedgerStore;

    #[tokio::test]
    async fn test_resolve_or_create_stages_new_organization() {
        let store = InMemoryLedgerStore::new();
        let registry = OrganizationRegistry::new(&store);
        let invocation = Invocation::new(Identity::user("alice"));

        let mut changes = StateChanges::default();
        let mut events = Vec::new();
        let address = registry
            .resolve_or_create(&invocation, &mut changes, &mut events)
            .await
            .unwrap();

        assert!(address.is_organization());
        assert_eq!(
            changes.memberships,
            vec![(Identity::user("alice"), address.clone())]
        );
        assert_eq!(changes.organizations.len(), 1);
        assert!(matches!(
            &events[..],
            [LedgerEvent::OrganizationCreated { address: a, .. }] if *a == address
        ));

        // Nothing is visible until committed.
        assert!(matches!(
            registry.lookup(&Identity::user("alice")).await,
            Err(LedgerError::NoOrganization(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_or_create_reuses_committed_organization() {
        let store = InMemoryLedgerStore::new();
        let registry = OrganizationRegistry::new(&store);

        let mut changes = StateChanges::default();
        let mut events = Vec::new();
        let first = registry
            .resolve_or_create(
                &Invocation::new(Identity::user("alice")),
                &mut changes,
                &mut events,
            )
            .await
            .unwrap();
        store.commit(changes).await.unwrap();

        let mut changes = StateChanges::default();
        let mut events = Vec::new();
        let second = registry
            .resolve_or_create(
                &Invocation::new(Identity::user("alice")),
                &mut changes,
                &mut events,
            )
            .await
            .unwrap();

        assert_eq!(first, second);
        assert!(changes.is_empty());
        assert!(events.is_empty());
        assert_eq!(registry.lookup(&Identity::user("alice")).await.unwrap(), first);
        assert!(registry.require_existing(&first).await.is_ok());
    }
}
