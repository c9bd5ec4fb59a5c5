//! Business logic services.
//!
//! Services borrow the gateway (and, for auth, the session) for the
//! duration of a call. They take the identity as an argument; none of them
//! reads the session behind the caller's back except `auth`, which writes it.

pub mod auth;
pub mod feedback;
pub mod orders;
pub mod profile;

pub use auth::{AuthError, AuthService};
pub use feedback::FeedbackService;
pub use orders::{OrderService, generate_order_no};
pub use profile::ProfileSynchronizer;
