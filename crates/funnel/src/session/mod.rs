//! Local session: the current identity and the language preference.
//!
//! The only state the funnel keeps on the participant's side. Everything
//! else is reloaded from the remote store.

mod file;
mod memory;

use std::sync::Arc;

use prize_funnel_core::{Identity, Language};
use thiserror::Error;

pub use file::FileIdentityStore;
pub use memory::MemoryIdentityStore;

/// Keys in the local store.
pub mod keys {
    /// Normalized phone of the signed-in participant.
    pub const USER_PHONE: &str = "rv_user_phone";

    /// Display language preference.
    pub const LANGUAGE: &str = "rv_language";
}

/// Errors from the local store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable string key-value storage.
pub trait IdentityStore: Send + Sync {
    /// Read a key.
    ///
    /// # Errors
    ///
    /// Returns error if the backing storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Write a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the backing storage cannot be written.
    fn store(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Remove a key. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the backing storage cannot be written.
    fn clear(&self, key: &str) -> Result<(), SessionError>;
}

/// Session context passed to every operation that needs the identity.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn IdentityStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.current())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session over a store.
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// A session that forgets everything when dropped.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryIdentityStore::default()))
    }

    /// The signed-in identity, if any.
    ///
    /// An unreadable store or a value with no digits reads as signed out.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        let raw = match self.store.load(keys::USER_PHONE) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read session identity");
                return None;
            }
        };

        match Identity::from_stored(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed session identity");
                None
            }
        }
    }

    /// Whether an identity is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Make `identity` the current session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be written.
    pub fn sign_in(&self, identity: &Identity) -> Result<(), SessionError> {
        self.store.store(keys::USER_PHONE, identity.as_str())
    }

    /// Forget the current identity.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be written.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.store.clear(keys::USER_PHONE)
    }

    /// The stored language, or `default` when none (or an unknown one) is stored.
    #[must_use]
    pub fn language(&self, default: Language) -> Language {
        match self.store.load(keys::LANGUAGE) {
            Ok(Some(raw)) => raw.parse().unwrap_or(default),
            Ok(None) => default,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read language preference");
                default
            }
        }
    }

    /// Persist a language preference.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be written.
    pub fn set_language(&self, language: Language) -> Result<(), SessionError> {
        self.store.store(keys::LANGUAGE, &language.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_and_out() {
        let session = Session::in_memory();
        assert_eq!(session.current(), None);

        let identity = Identity::parse("5551234567").unwrap();
        session.sign_in(&identity).unwrap();
        assert_eq!(session.current(), Some(identity));
        assert!(session.is_authenticated());

        session.sign_out().unwrap();
        assert_eq!(session.current(), None);
    }

    #[test]
    fn test_sign_in_overwrites_previous_identity() {
        let session = Session::in_memory();
        session
            .sign_in(&Identity::parse("5551234567").unwrap())
            .unwrap();
        session
            .sign_in(&Identity::parse("5550000000").unwrap())
            .unwrap();

        assert_eq!(session.current().unwrap().as_str(), "+15550000000");
    }

    #[test]
    fn test_malformed_stored_identity_reads_as_signed_out() {
        let store = Arc::new(MemoryIdentityStore::default());
        store.store(keys::USER_PHONE, "not a phone").unwrap();

        let session = Session::new(store);
        assert_eq!(session.current(), None);
    }

    #[test]
    fn test_hand_edited_identity_is_normalized() {
        let store = Arc::new(MemoryIdentityStore::default());
        store.store(keys::USER_PHONE, "555-123-4567").unwrap();

        let session = Session::new(store);
        assert_eq!(session.current().unwrap().as_str(), "+15551234567");
    }

    #[test]
    fn test_language_preference() {
        let session = Session::in_memory();
        assert_eq!(session.language(Language::Zh), Language::Zh);

        session.set_language(Language::En).unwrap();
        assert_eq!(session.language(Language::Zh), Language::En);
    }

    #[test]
    fn test_unknown_language_falls_back_to_default() {
        let store = Arc::new(MemoryIdentityStore::default());
        store.store(keys::LANGUAGE, "klingon").unwrap();

        let session = Session::new(store);
        assert_eq!(session.language(Language::En), Language::En);
    }
}
