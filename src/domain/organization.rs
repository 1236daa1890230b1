use super::identity::{Identity, InvocationId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMember {
    pub address: Identity,
    pub role: MemberRole,
}

/// The ledger account type: balances are held by organizations, never by
/// users directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub address: Identity,
    pub members: Vec<OrganizationMember>,
}

impl Organization {
    /// A fresh organization whose only member is its creator, as admin.
    pub fn founded_by(creator: Identity, invocation: InvocationId) -> Self {
        let address = derive_address(&creator, invocation);
        Self {
            address,
            members: vec![OrganizationMember {
                address: creator,
                role: MemberRole::Admin,
            }],
        }
    }
}

/// `SHA-256(SHA-256(creator) || invocation)`, hex encoded.
///
/// The invocation id makes the address unique per creation event, so two
/// depositors can never collide.
pub fn derive_address(creator: &Identity, invocation: InvocationId) -> Identity {
    let creator_hash = Sha256::digest(creator.to_string().as_bytes());
    let mut hasher = Sha256::new();
    hasher.update(creator_hash);
    hasher.update(invocation.as_bytes());
    Identity::organization(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_founded_by_creates_single_admin() {
        let creator = Identity::user("alice");
        let org = Organization::founded_by(creator.clone(), InvocationId::generate());

        assert!(org.address.is_organization());
        assert_eq!(org.members.len(), 1);
        assert_eq!(org.members[0].role, MemberRole::Admin);
        assert_eq!(org.members[0].address, creator);
    }

    #[test]
    fn test_derive_address_is_deterministic_per_invocation() {
        let alice = Identity::user("alice");
        let id = InvocationId::from_uuid(Uuid::from_u128(7));

        let first = derive_address(&alice, id);
        assert_eq!(first, derive_address(&alice, id));
        assert_eq!(first.address().len(), 64);

        let other_invocation = InvocationId::from_uuid(Uuid::from_u128(8));
        assert_ne!(first, derive_address(&alice, other_invocation));
        assert_ne!(first, derive_address(&Identity::user("bob"), id));
    }
}
