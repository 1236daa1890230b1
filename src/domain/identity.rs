use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const ORGANIZATION_PREFIX: &str = "org:";

/// An address on the ledger.
///
/// Users and organizations share a single keyspace: balances, role holders and
/// transfer endpoints are all keyed by `Identity`. Organizations render with an
/// `org:` prefix so the two variants round-trip through their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Identity {
    User(String),
    Organization(String),
}

impl Identity {
    pub fn user(address: impl Into<String>) -> Self {
        Self::User(address.into())
    }

    pub fn organization(address: impl Into<String>) -> Self {
        Self::Organization(address.into())
    }

    pub fn is_organization(&self) -> bool {
        matches!(self, Self::Organization(_))
    }

    /// The bare address, without the organization prefix.
    pub fn address(&self) -> &str {
        match self {
            Self::User(address) | Self::Organization(address) => address,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(address) => f.write_str(address),
            Self::Organization(address) => write!(f, "{ORGANIZATION_PREFIX}{address}"),
        }
    }
}

impl FromStr for Identity {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let identity = match s.strip_prefix(ORGANIZATION_PREFIX) {
            Some(address) => Self::Organization(address.to_string()),
            None => Self::User(s.to_string()),
        };
        if identity.address().is_empty() {
            return Err(LedgerError::InvalidIdentity(s.to_string()));
        }
        Ok(identity)
    }
}

impl TryFrom<String> for Identity {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_string()
    }
}

/// Unique per invocation; seeds organization address derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who is calling, and which call this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub sender: Identity,
    pub id: InvocationId,
}

impl Invocation {
    pub fn new(sender: Identity) -> Self {
        Self {
            sender,
            id: InvocationId::generate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_text_form() {
        let user: Identity = "alice".parse().unwrap();
        assert_eq!(user, Identity::user("alice"));
        assert_eq!(user.to_string(), "alice");

        let org: Identity = "org:ab12".parse().unwrap();
        assert_eq!(org, Identity::organization("ab12"));
        assert!(org.is_organization());
        assert_eq!(org.address(), "ab12");
        assert_eq!(org.to_string(), "org:ab12");
    }

    #[test]
    fn test_identity_rejects_blank() {
        assert!(matches!(
            "".parse::<Identity>(),
            Err(LedgerError::InvalidIdentity(_))
        ));
        assert!(matches!(
            "org:".parse::<Identity>(),
            Err(LedgerError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn test_identity_serde_uses_text_form() {
        let json = serde_json::to_string(&Identity::organization("ff")).unwrap();
        assert_eq!(json, "\"org:ff\"");
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Identity::organization("ff"));
    }

    #[test]
    fn test_invocations_are_unique() {
        let a = Invocation::new(Identity::user("alice"));
        let b = Invocation::new(Identity::user("alice"));
        assert_ne!(a.id, b.id);
    }
}
