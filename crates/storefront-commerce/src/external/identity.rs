//! Identity collaborator.
//!
//! User accounts, roles and credentials live in an external identity
//! provider; the commerce core only ever holds an opaque [`UserId`].
//! This seam exposes the one read the core needs: resolving a user id
//! to contact details for notifications.

use crate::ids::UserId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Contact details for a known user.
#[derive(Debug, Clone)]
pub struct UserRef {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
}

/// Read-only identity lookup seam.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Resolve a user id. `None` when the provider does not know it.
    async fn find_user(&self, user_id: &UserId) -> Option<UserRef>;
}

/// In-memory gateway backed by a registration map. Used in tests and
/// in environments without an identity provider.
#[derive(Debug, Default)]
pub struct StaticIdentityGateway {
    users: RwLock<HashMap<String, UserRef>>,
}

impl StaticIdentityGateway {
    /// An empty gateway: every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user for later lookups.
    pub fn register(&self, user: UserRef) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.id.as_str().to_string(), user);
    }
}

#[async_trait]
impl IdentityGateway for StaticIdentityGateway {
    async fn find_user(&self, user_id: &UserId) -> Option<UserRef> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id.as_str())
            .cloned()
    }
}
