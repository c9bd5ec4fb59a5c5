//! Application state shared by the controller and its background writes.

use std::sync::Arc;

use prize_funnel_core::Language;

use crate::config::FunnelConfig;
use crate::gateway::{self, GatewayError, PersistenceGateway};
use crate::services::{AuthService, FeedbackService, OrderService, ProfileSynchronizer};
use crate::session::{FileIdentityStore, Session};

/// Application state.
///
/// This struct is cheaply cloneable via `Arc`; spawned writes hold a clone
/// so they outlive the callback that started them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    gateway: Arc<dyn PersistenceGateway>,
    session: Session,
    default_language: Language,
}

impl AppState {
    /// Create application state from its parts.
    #[must_use]
    pub fn new(gateway: Arc<dyn PersistenceGateway>, session: Session) -> Self {
        Self::with_language(gateway, session, Language::default())
    }

    /// Create application state with a default display language.
    #[must_use]
    pub fn with_language(
        gateway: Arc<dyn PersistenceGateway>,
        session: Session,
        default_language: Language,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                gateway,
                session,
                default_language,
            }),
        }
    }

    /// Create application state from configuration.
    ///
    /// Uses the file-backed session at `config.session_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote client cannot be built.
    pub fn from_config(config: &FunnelConfig) -> Result<Self, GatewayError> {
        let gateway = gateway::connect(config.gateway.as_ref())?;
        let session = Session::new(Arc::new(FileIdentityStore::new(&config.session_path)));

        Ok(Self::with_language(
            gateway,
            session,
            config.default_language,
        ))
    }

    /// Get a reference to the remote store.
    #[must_use]
    pub fn gateway(&self) -> &dyn PersistenceGateway {
        self.inner.gateway.as_ref()
    }

    /// Get a reference to the session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Language used when none is stored.
    #[must_use]
    pub fn default_language(&self) -> Language {
        self.inner.default_language
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.gateway(), self.session())
    }

    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.gateway())
    }

    #[must_use]
    pub fn feedback(&self) -> FeedbackService<'_> {
        FeedbackService::new(self.gateway())
    }

    #[must_use]
    pub fn profiles(&self) -> ProfileSynchronizer<'_> {
        ProfileSynchronizer::new(self.gateway())
    }
}
