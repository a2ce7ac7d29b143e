use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Identity - internal user records
// ============================================================================
//
// Callers authenticate against an external provider. Workflows only ever see
// the internal `User` resolved from the provider's subject string, so the
// provider's shape never leaks into domain logic.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Subject identifier issued by the external authentication provider.
    pub subject: String,
    pub email: String,
}

impl User {
    pub fn new(subject: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            email: email.into(),
        }
    }
}
