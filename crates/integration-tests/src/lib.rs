//! Integration tests for the prize funnel.
//!
//! The tests drive [`FunnelApp`] end to end against the in-memory gateway,
//! so they need no network and no Supabase project.
//!
//! ```bash
//! cargo test -p prize-funnel-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use prize_funnel::gateway::MemoryGateway;
use prize_funnel::session::{FileIdentityStore, Session};
use prize_funnel::{AppState, FunnelApp};
use prize_funnel_core::ShippingInfo;

/// A remote store shared by every app opened from this context.
///
/// Apps opened with [`TestContext::reopen`] share the session file too,
/// which is how a page reload looks to the funnel.
pub struct TestContext {
    pub gateway: Arc<MemoryGateway>,
    session_path: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestContext {
    /// Create an empty remote store and session directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create session directory");
        Self {
            gateway: Arc::new(MemoryGateway::new()),
            session_path: dir.path().join("session.json"),
            _dir: dir,
        }
    }

    #[must_use]
    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// Application state over the shared store and session file.
    #[must_use]
    pub fn state(&self) -> AppState {
        let session = Session::new(Arc::new(FileIdentityStore::new(&self.session_path)));
        AppState::new(self.gateway.clone(), session)
    }

    /// A fresh app at the landing page, not yet hydrated.
    #[must_use]
    pub fn open(&self) -> FunnelApp {
        FunnelApp::new(self.state())
    }

    /// A fresh app hydrated from the remote store, as after a reload.
    pub async fn reopen(&self) -> FunnelApp {
        FunnelApp::start(self.state()).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The shipping form most scenarios submit.
#[must_use]
pub fn jane_shipping() -> ShippingInfo {
    ShippingInfo::new("Jane", "5559998888", "1 Main St")
}
