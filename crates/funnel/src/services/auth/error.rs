//! Authentication error types.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::session::SessionError;

/// Errors that can occur during sign-in and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Phone input has no digits.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] prize_funnel_core::IdentityError),

    /// Password input is empty.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// No user with this phone and password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Phone already registered.
    #[error("user already exists")]
    DuplicateIdentity,

    /// Remote store error.
    #[error("remote store error: {0}")]
    Gateway(#[from] GatewayError),

    /// Local session could not be written.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}
