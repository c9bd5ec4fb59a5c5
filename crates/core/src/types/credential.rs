//! Login credential types.
//!
//! Passwords are stored and compared in plaintext by the remote store. This
//! type does not hash them; it only keeps them out of `Debug` output.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// A phone/password pair as held by the remote `app_users` table.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Normalized phone number, unique across credentials.
    #[serde(rename = "phone")]
    pub identity: Identity,
    /// Plaintext password.
    pub password: String,
}

impl Credential {
    /// Create a new credential.
    #[must_use]
    pub const fn new(identity: Identity, password: String) -> Self {
        Self { identity, password }
    }

    /// Get the identity this credential belongs to.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identity", &self.identity)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
