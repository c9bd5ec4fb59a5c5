//! Authentication service.
//!
//! Phone and password sign-in. Passwords are compared by the remote store in
//! plaintext; this service never sees a stored password.

mod error;

pub use error::AuthError;

use prize_funnel_core::{Credential, Identity};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::gateway::{GatewayError, PersistenceGateway};
use crate::session::Session;

/// Authentication service.
///
/// Handles registration, login, and logout against the `app_users` table.
pub struct AuthService<'a> {
    gateway: &'a dyn PersistenceGateway,
    session: &'a Session,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(gateway: &'a dyn PersistenceGateway, session: &'a Session) -> Self {
        Self { gateway, session }
    }

    /// Register a new user and sign them in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPhone` or `AuthError::EmptyPassword` before
    /// any remote call.
    /// Returns `AuthError::DuplicateIdentity` if the phone is already
    /// registered; the existing row is left untouched.
    pub async fn register(&self, phone: &str, password: &str) -> Result<Identity, AuthError> {
        let credential = parse_credential(phone, password)?;

        self.gateway
            .insert_user(&credential)
            .await
            .map_err(|e| match e {
                GatewayError::Conflict(_) => AuthError::DuplicateIdentity,
                other => AuthError::Gateway(other),
            })?;

        tracing::info!(identity = %credential.identity(), "Registered new user");
        self.start_session(credential)
    }

    /// Sign in with phone and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no user matches both.
    pub async fn login(&self, phone: &str, password: &str) -> Result<Identity, AuthError> {
        let credential = parse_credential(phone, password)?;

        self.gateway
            .find_user(&credential)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        tracing::info!(identity = %credential.identity(), "User logged in");
        self.start_session(credential)
    }

    /// Forget the current identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the local store cannot be written.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.sign_out()?;
        clear_sentry_user();
        tracing::info!("User logged out");
        Ok(())
    }

    fn start_session(&self, credential: Credential) -> Result<Identity, AuthError> {
        let identity = credential.identity;
        self.session.sign_in(&identity)?;
        set_sentry_user(&identity);
        Ok(identity)
    }
}

/// Normalize the phone and reject empty input.
fn parse_credential(phone: &str, password: &str) -> Result<Credential, AuthError> {
    let identity = Identity::parse(phone)?;
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    Ok(Credential::new(identity, password.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayOp, MemoryGateway, MockGateway};

    #[tokio::test]
    async fn test_register_then_login() {
        let gateway = MemoryGateway::new();
        let session = Session::in_memory();
        let auth = AuthService::new(&gateway, &session);

        let identity = auth.register("5551234567", "pw123").await.unwrap();
        assert_eq!(identity.as_str(), "+15551234567");
        assert_eq!(session.current(), Some(identity.clone()));

        auth.logout().unwrap();
        assert_eq!(session.current(), None);

        // Formatted input reaches the same identity.
        let again = auth.login("(555) 123-4567", "pw123").await.unwrap();
        assert_eq!(again, identity);
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_original_password() {
        let gateway = MemoryGateway::new();
        let session = Session::in_memory();
        let auth = AuthService::new(&gateway, &session);

        auth.register("5551234567", "pw123").await.unwrap();
        auth.logout().unwrap();

        let err = auth.register("15551234567", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity));
        assert_eq!(session.current(), None);

        assert!(auth.login("5551234567", "pw123").await.is_ok());
        assert!(matches!(
            auth.login("5551234567", "other").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_session_alone() {
        let gateway = MemoryGateway::new();
        let session = Session::in_memory();
        let auth = AuthService::new(&gateway, &session);
        auth.register("5551234567", "pw123").await.unwrap();

        let err = auth.login("5550000000", "pw123").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(session.current().unwrap().as_str(), "+15551234567");
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_remote_call() {
        // Any call on the mock would panic: no expectations are set.
        let gateway = MockGateway::new();
        let session = Session::in_memory();
        let auth = AuthService::new(&gateway, &session);

        assert!(matches!(
            auth.login("", "pw123").await,
            Err(AuthError::InvalidPhone(_))
        ));
        assert!(matches!(
            auth.register("5551234567", "").await,
            Err(AuthError::EmptyPassword)
        ));
    }

    #[tokio::test]
    async fn test_remote_failure_is_not_invalid_credentials() {
        let gateway = MemoryGateway::new();
        gateway.fail(GatewayOp::FindUser);
        let session = Session::in_memory();
        let auth = AuthService::new(&gateway, &session);

        let err = auth.login("5551234567", "pw123").await.unwrap_err();
        assert!(matches!(err, AuthError::Gateway(_)));
    }
}
