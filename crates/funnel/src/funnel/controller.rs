//! The callback layer the step views call.
//!
//! Writes on the funnel path are fail-open: the remote write is spawned in
//! the background, the local state is patched and the machine advances no
//! matter how the write turns out. Reads are fail-closed: a failed read
//! leaves local state alone or yields an empty list.

use prize_funnel_core::{
    Feedback, FeedbackDraft, Identity, Language, Order, OrderId, ProfileSnapshot, ShippingInfo,
    UserState,
};

use super::machine::{FunnelMachine, Step};
use super::pending::PendingWrite;
use crate::error::{FunnelError, Result, add_breadcrumb};
use crate::state::AppState;

/// What the profile page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOverview {
    pub identity: Option<Identity>,
    pub prize: Option<String>,
    pub rating: u8,
    pub feedback: String,
    pub shipping_info: Option<ShippingInfo>,
    pub language: Language,
}

/// One participant's run through the funnel.
pub struct FunnelApp {
    state: AppState,
    machine: FunnelMachine,
    user: UserState,
}

impl FunnelApp {
    /// Create an app at [`Step::Landing`] with empty local state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            machine: FunnelMachine::new(),
            user: UserState::default(),
        }
    }

    /// Create an app and hydrate it from the remote store.
    pub async fn start(state: AppState) -> Self {
        let mut app = Self::new(state);
        app.sync_profile().await;
        app
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.machine.current()
    }

    #[must_use]
    pub const fn user_state(&self) -> &UserState {
        &self.user
    }

    /// The signed-in identity, read from the session each time.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.session().current()
    }

    // =========================================================================
    // Profile Sync
    // =========================================================================

    /// Reload progress for the current identity.
    ///
    /// Returns `true` if a snapshot was applied. A snapshot loaded for an
    /// identity that is no longer current is discarded.
    pub async fn sync_profile(&mut self) -> bool {
        let requested = self.identity();
        let Some(snapshot) = self.state.profiles().load_profile(requested.as_ref()).await else {
            return false;
        };

        if !is_current(self.identity().as_ref(), &snapshot) {
            tracing::debug!(
                loaded_for = %snapshot.identity,
                "Discarding profile loaded for a previous session"
            );
            return false;
        }

        self.user.apply_profile(snapshot);
        true
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn advance(&mut self) -> Step {
        let authenticated = self.state.session().is_authenticated();
        self.machine.advance(authenticated)
    }

    pub fn back(&mut self) -> Step {
        self.machine.back()
    }

    pub fn navigate(&mut self, step: Step) -> Step {
        self.machine.navigate(step)
    }

    pub fn reset(&mut self) -> Step {
        self.machine.reset()
    }

    pub fn view_orders(&mut self) -> Step {
        self.machine.view_orders()
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Register, sign in, reload progress, and leave the login step.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::Auth` with `DuplicateIdentity` if the phone is
    /// taken, or a validation error for empty input.
    pub async fn register(&mut self, phone: &str, password: &str) -> Result<Identity> {
        let previous = self.identity();
        let identity = self.state.auth().register(phone, password).await?;
        self.enter_session(previous, &identity).await;
        Ok(identity)
    }

    /// Sign in, reload progress, and leave the login step.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::Auth` with `InvalidCredentials` on mismatch.
    pub async fn login(&mut self, phone: &str, password: &str) -> Result<Identity> {
        let previous = self.identity();
        let identity = self.state.auth().login(phone, password).await?;
        self.enter_session(previous, &identity).await;
        Ok(identity)
    }

    /// Sign out, drop local progress, and return to the landing page.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::Auth` if the session store cannot be written.
    pub fn logout(&mut self) -> Result<()> {
        self.state.auth().logout()?;
        self.user = UserState::default();
        self.machine.reset();
        Ok(())
    }

    async fn enter_session(&mut self, previous: Option<Identity>, identity: &Identity) {
        if previous.as_ref() != Some(identity) {
            self.user = UserState::default();
        }
        self.sync_profile().await;

        if matches!(self.step(), Step::Landing | Step::Login) {
            self.advance();
        }
    }

    // =========================================================================
    // Funnel Callbacks
    // =========================================================================

    /// The wheel stopped on `prize`.
    ///
    /// Nothing is written remotely until shipping details arrive, so a
    /// participant who abandons after spinning leaves no order behind.
    pub fn on_win(&mut self, prize: &str) -> Step {
        add_breadcrumb("funnel", "Prize won", Some(&[("prize", prize)]));
        tracing::info!(prize, "Prize won");

        self.user.record_win(prize);
        self.advance()
    }

    /// The participant submitted a rating.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::Feedback` if the rating is out of range or the
    /// comment is too short for it, and `FunnelError::NoRuntime` outside a
    /// Tokio runtime. Nothing is written and the step stays.
    pub fn on_feedback(&mut self, rating: u8, comment: &str) -> Result<PendingWrite<Feedback>> {
        let draft = FeedbackDraft::new(rating, comment)?;
        draft.validate()?;

        let state = self.state.clone();
        let identity = self.identity();
        let text = draft.comment.clone();
        let write = PendingWrite::spawn("submit_feedback", async move {
            state
                .feedback()
                .submit_feedback(identity.as_ref(), rating, &text)
                .await
        })?;

        self.user.record_feedback(draft.rating, draft.comment);
        self.advance();
        Ok(write)
    }

    /// The participant submitted shipping details.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::Shipping` if a mandatory field is blank, and
    /// `FunnelError::NoRuntime` outside a Tokio runtime. Nothing is written
    /// and the step stays.
    pub fn on_shipping(&mut self, info: ShippingInfo) -> Result<PendingWrite<Order>> {
        let info = info.normalized();
        info.validate()?;

        let state = self.state.clone();
        let identity = self.identity();
        let prize = self.user.prize.clone().unwrap_or_default();
        let shipping = info.clone();
        let write = PendingWrite::spawn("submit_win_and_shipping", async move {
            state
                .orders()
                .submit_win_and_shipping(identity.as_ref(), &prize, shipping)
                .await
        })?;

        self.user.record_shipping(info);
        self.advance();
        Ok(write)
    }

    // =========================================================================
    // Orders & Profile
    // =========================================================================

    /// Order history, newest first. Empty when signed out or on failure.
    pub async fn orders(&self) -> Vec<Order> {
        let identity = self.identity();
        match self.state.orders().list_orders(identity.as_ref()).await {
            Ok(orders) => orders,
            Err(FunnelError::Unauthenticated) => Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load orders");
                Vec::new()
            }
        }
    }

    /// Change the shipping address of one of the participant's orders.
    ///
    /// # Errors
    ///
    /// Surfaces every failure, including remote ones.
    pub async fn update_order_shipping(
        &self,
        order_id: OrderId,
        info: ShippingInfo,
    ) -> Result<Order> {
        let identity = self.identity();
        self.state
            .orders()
            .update_shipping(identity.as_ref(), order_id, info)
            .await
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.state
            .session()
            .language(self.state.default_language())
    }

    /// Persist the display language.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::Session` if the store cannot be written.
    pub fn set_language(&self, language: Language) -> Result<()> {
        self.state.session().set_language(language)?;
        Ok(())
    }

    #[must_use]
    pub fn overview(&self) -> ProfileOverview {
        ProfileOverview {
            identity: self.identity(),
            prize: self.user.prize.clone(),
            rating: self.user.rating_value(),
            feedback: self.user.feedback.clone(),
            shipping_info: self.user.shipping_info.clone(),
            language: self.language(),
        }
    }
}

/// Whether a snapshot belongs to the identity that is current now.
fn is_current(current: Option<&Identity>, snapshot: &ProfileSnapshot) -> bool {
    current == Some(&snapshot.identity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use prize_funnel_core::{FeedbackError, OrderStatus, Rating};

    use super::*;
    use crate::gateway::{GatewayError, GatewayOp, MemoryGateway, MockGateway, PersistenceGateway};
    use crate::session::Session;

    fn app_with(gateway: Arc<dyn PersistenceGateway>) -> FunnelApp {
        FunnelApp::new(AppState::new(gateway, Session::in_memory()))
    }

    fn memory_app() -> (Arc<MemoryGateway>, FunnelApp) {
        let gateway = Arc::new(MemoryGateway::new());
        let app = app_with(gateway.clone());
        (gateway, app)
    }

    fn shipping() -> ShippingInfo {
        ShippingInfo::new("Jane", "5559998888", "1 Main St")
    }

    #[tokio::test]
    async fn test_register_advances_to_game() {
        let (_, mut app) = memory_app();
        app.advance();
        assert_eq!(app.step(), Step::Login);

        app.register("5551234567", "pw123").await.unwrap();
        assert_eq!(app.step(), Step::Game);
    }

    #[tokio::test]
    async fn test_failed_login_stays_on_login() {
        let (_, mut app) = memory_app();
        app.advance();

        let err = app.login("5551234567", "pw123").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidCredentials);
        assert_eq!(app.step(), Step::Login);
    }

    #[tokio::test]
    async fn test_win_is_fail_open() {
        let (gateway, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        gateway.fail_everything();

        assert_eq!(app.on_win("Free Sample"), Step::Feedback);
        assert!(app.user_state().has_spun);
        assert_eq!(app.user_state().prize.as_deref(), Some("Free Sample"));
        assert!(gateway.orders().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_write_failure_still_advances() {
        let (gateway, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        app.on_win("Free Sample");
        gateway.fail(GatewayOp::InsertFeedback);

        let write = app.on_feedback(5, "").unwrap();
        assert_eq!(app.step(), Step::Shipping);
        assert_eq!(app.user_state().rating_value(), 5);

        assert_eq!(write.settled().await, None);
        assert!(gateway.feedbacks().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_gate_blocks_without_writing() {
        let (gateway, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        app.on_win("Free Sample");

        let err = app.on_feedback(1, "bad").unwrap_err();
        assert!(matches!(
            err,
            FunnelError::Feedback(FeedbackError::CommentTooShort { .. })
        ));
        assert_eq!(app.step(), Step::Feedback);
        assert_eq!(app.user_state().rating, None);
        assert_eq!(gateway.calls(GatewayOp::InsertFeedback), 0);
    }

    #[tokio::test]
    async fn test_shipping_creates_order_and_reaches_success() {
        let (gateway, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        app.on_win("1 Month Supply Pack");
        app.on_feedback(4, "").unwrap().settled().await.unwrap();

        let order = app.on_shipping(shipping()).unwrap().settled().await.unwrap();
        assert_eq!(app.step(), Step::Success);
        assert_eq!(order.status, OrderStatus::Reviewing);
        assert_eq!(gateway.orders().len(), 1);
        assert!(app.user_state().has_order());
    }

    #[tokio::test]
    async fn test_shipping_validation_blocks() {
        let (gateway, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        app.on_win("Free Sample");
        app.on_feedback(5, "").unwrap().detach();

        let err = app
            .on_shipping(ShippingInfo::new("Jane", "5559998888", " "))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        assert_eq!(app.step(), Step::Shipping);
        assert_eq!(gateway.calls(GatewayOp::InsertOrder), 0);
    }

    #[tokio::test]
    async fn test_shipping_while_signed_out_still_advances() {
        let (gateway, mut app) = memory_app();
        app.navigate(Step::Shipping);

        let write = app.on_shipping(shipping()).unwrap();
        assert_eq!(app.step(), Step::Success);
        assert_eq!(write.settled().await, None);
        assert_eq!(gateway.calls(GatewayOp::InsertOrder), 0);
    }

    #[tokio::test]
    async fn test_orders_fail_closed_to_empty() {
        let (gateway, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        app.on_win("Free Sample");
        app.on_shipping(shipping()).unwrap().settled().await.unwrap();
        assert_eq!(app.orders().await.len(), 1);

        gateway.fail(GatewayOp::ListOrders);
        assert!(app.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_sync_failure_leaves_state_untouched() {
        let (gateway, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        app.on_win("Free Sample");

        gateway.fail(GatewayOp::LatestFeedback);
        assert!(!app.sync_profile().await);
        assert_eq!(app.user_state().prize.as_deref(), Some("Free Sample"));
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let (_, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        app.on_win("Free Sample");

        app.logout().unwrap();
        assert_eq!(app.step(), Step::Landing);
        assert_eq!(app.identity(), None);
        assert_eq!(app.user_state(), &UserState::default());
    }

    #[tokio::test]
    async fn test_switching_identity_drops_previous_progress() {
        let (_, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        app.on_win("Free Sample");
        app.on_feedback(2, "Not what I expected at all").unwrap().settled().await;

        app.reset();
        app.register("5550000000", "pw456").await.unwrap();
        assert_eq!(app.user_state(), &UserState::default());
    }

    #[tokio::test]
    async fn test_profile_for_previous_session_is_discarded() {
        let session = Session::in_memory();
        let jane = Identity::parse("5551234567").unwrap();
        session.sign_in(&jane).unwrap();

        // The session switches while the order read is in flight.
        let mut gateway = MockGateway::new();
        let switcher = session.clone();
        gateway.expect_latest_order().returning(move |_| {
            switcher
                .sign_in(&Identity::parse("5550000000").unwrap())
                .unwrap();
            Ok(None)
        });
        gateway.expect_latest_feedback().returning(|_| Ok(None));

        let mut app = FunnelApp::new(AppState::new(Arc::new(gateway), session));
        app.user.record_win("kept");

        assert!(!app.sync_profile().await);
        assert_eq!(app.user_state().prize.as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_disconnected_remote_still_completes_funnel() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_insert_feedback()
            .returning(|_| Err(GatewayError::NotConfigured));
        gateway
            .expect_insert_order()
            .returning(|_| Err(GatewayError::NotConfigured));

        let session = Session::in_memory();
        session
            .sign_in(&Identity::parse("5551234567").unwrap())
            .unwrap();
        let mut app = FunnelApp::new(AppState::new(Arc::new(gateway), session));

        app.advance();
        assert_eq!(app.step(), Step::Game);
        app.on_win("Free Sample");
        assert_eq!(app.on_feedback(5, "").unwrap().settled().await, None);
        assert_eq!(app.on_shipping(shipping()).unwrap().settled().await, None);
        assert_eq!(app.step(), Step::Success);
    }

    #[test]
    fn test_callbacks_outside_runtime_fail_without_advancing() {
        let gateway = Arc::new(MemoryGateway::new());
        let session = Session::in_memory();
        session
            .sign_in(&Identity::parse("5551234567").unwrap())
            .unwrap();
        let mut app = FunnelApp::new(AppState::new(gateway.clone(), session));
        app.navigate(Step::Game);
        app.on_win("Free Sample");

        let err = app.on_feedback(5, "").unwrap_err();
        assert!(matches!(err, FunnelError::NoRuntime("submit_feedback")));
        assert_eq!(app.step(), Step::Feedback);
        assert_eq!(app.user_state().rating, None);

        app.navigate(Step::Shipping);
        let err = app.on_shipping(shipping()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
        assert_eq!(app.step(), Step::Shipping);
        assert!(!app.user_state().has_order());
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_overview_and_language() {
        let (_, mut app) = memory_app();
        app.register("5551234567", "pw123").await.unwrap();
        app.on_win("Free Sample");
        app.on_feedback(4, "").unwrap().detach();

        assert_eq!(app.language(), Language::Zh);
        app.set_language(Language::En).unwrap();

        let overview = app.overview();
        assert_eq!(overview.identity.unwrap().as_str(), "+15551234567");
        assert_eq!(overview.prize.as_deref(), Some("Free Sample"));
        assert_eq!(overview.rating, Rating::new(4).unwrap().stars());
        assert_eq!(overview.language, Language::En);
    }
}
