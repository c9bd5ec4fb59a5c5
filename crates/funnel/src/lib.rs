//! Prize funnel library.
//!
//! Drives a visitor from the landing page through the prize wheel, a rating,
//! and a shipping form, keeping local progress in step with the orders and
//! feedback stored remotely.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use prize_funnel::{AppState, FunnelApp, FunnelConfig};
//!
//! let config = FunnelConfig::from_env()?;
//! let mut app = FunnelApp::start(AppState::from_config(&config)?).await;
//! app.login("5551234567", "pw123").await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod funnel;
pub mod gateway;
pub mod services;
pub mod session;
pub mod state;

pub use config::FunnelConfig;
pub use error::{ErrorKind, FunnelError};
pub use funnel::{FunnelApp, PendingWrite, Step};
pub use state::AppState;
