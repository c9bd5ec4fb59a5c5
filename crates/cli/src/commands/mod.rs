//! Command implementations.
//!
//! Every command opens the funnel against the configured remote store and
//! the local session file, then reports through `tracing`.

pub mod account;
pub mod claim;
pub mod orders;
pub mod settings;

use clap::Args;
use prize_funnel::config::FunnelConfig;
use prize_funnel::gateway::GatewayError;
use prize_funnel::{AppState, FunnelApp, FunnelError};
use prize_funnel_core::ShippingInfo;
use thiserror::Error;

pub use claim::ClaimArgs;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The remote client could not be built.
    #[error("Remote store setup failed: {0}")]
    Setup(#[from] GatewayError),

    /// A funnel operation failed.
    #[error(transparent)]
    Funnel(#[from] FunnelError),
}

impl CommandError {
    /// Message for the terminal.
    pub fn user_message(&self) -> String {
        match self {
            Self::Setup(_) => "Could not connect to the remote store".to_string(),
            Self::Funnel(err) => err.user_message(),
        }
    }
}

/// Shipping form fields.
#[derive(Args, Debug, Clone)]
pub struct ShippingArgs {
    /// Recipient name
    #[arg(long)]
    pub name: String,

    /// Recipient phone
    #[arg(long = "phone")]
    pub phone: String,

    /// Street address
    #[arg(long)]
    pub address: String,

    /// Second address line
    #[arg(long)]
    pub address2: Option<String>,

    /// City
    #[arg(long, default_value = "")]
    pub city: String,

    /// Province or state
    #[arg(long, default_value = "")]
    pub province: String,

    /// Postal code
    #[arg(long = "zip", default_value = "")]
    pub zip_code: String,

    /// Recipient initials
    #[arg(long)]
    pub initials: Option<String>,

    /// Delivery location note
    #[arg(long)]
    pub location: Option<String>,
}

impl From<ShippingArgs> for ShippingInfo {
    fn from(args: ShippingArgs) -> Self {
        Self {
            name: args.name,
            phone: args.phone,
            province: args.province,
            city: args.city,
            address: args.address,
            address2: args.address2,
            zip_code: args.zip_code,
            initials: args.initials,
            location: args.location,
        }
    }
}

/// Build the funnel and hydrate it for the stored session.
///
/// # Errors
///
/// Returns error if the remote client cannot be built.
pub async fn open_app(config: &FunnelConfig) -> Result<FunnelApp, CommandError> {
    let state = AppState::from_config(config)?;
    tracing::debug!(session = %config.session_path.display(), "Opening funnel");
    Ok(FunnelApp::start(state).await)
}
