//! Prize funnel CLI - drive the funnel from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (signs in)
//! funnel register -p 5551234567 -w pw123
//!
//! # Spin result, rating, and shipping in one go
//! funnel claim --prize "1 Month Supply Pack" --rating 2 \
//!     --comment "Too sweet for my taste" --name Jane --phone 5559998888 --address "1 Main St"
//!
//! # Order history and address changes
//! funnel orders
//! funnel edit-address --order 7 --name Jane --phone 5559998888 --address "2 Oak Ave"
//!
//! # Display language
//! funnel language en
//! ```
//!
//! The session is kept in `FUNNEL_SESSION_PATH` between runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use prize_funnel::config::{FunnelConfig, LogFormat};
use prize_funnel_core::Language;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{ClaimArgs, CommandError, ShippingArgs};

#[derive(Parser)]
#[command(name = "funnel")]
#[command(author, version, about = "Spin-to-win prize funnel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        /// Phone number, any formatting
        #[arg(short, long)]
        phone: String,

        /// Password
        #[arg(short = 'w', long)]
        password: String,
    },
    /// Sign in
    Login {
        /// Phone number, any formatting
        #[arg(short, long)]
        phone: String,

        /// Password
        #[arg(short = 'w', long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in participant's progress
    Profile,
    /// List orders, newest first
    Orders,
    /// Record a prize, a rating, and shipping details
    Claim(ClaimArgs),
    /// Change the shipping address of an open order
    EditAddress {
        /// Order ID, as shown by `funnel orders`
        #[arg(short, long)]
        order: i64,

        #[command(flatten)]
        shipping: ShippingArgs,
    },
    /// Show or set the display language
    Language {
        /// `zh` or `en`; omit to show the current setting
        language: Option<Language>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &FunnelConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing with `EnvFilter` and Sentry integration.
fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prize_funnel=info,funnel=info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match FunnelConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        #[allow(clippy::print_stderr)]
        {
            eprintln!("{}", e.user_message());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &FunnelConfig) -> Result<(), CommandError> {
    let mut app = commands::open_app(config).await?;

    match cli.command {
        Commands::Register { phone, password } => {
            commands::account::register(&mut app, &phone, &password).await?;
        }
        Commands::Login { phone, password } => {
            commands::account::login(&mut app, &phone, &password).await?;
        }
        Commands::Logout => commands::account::logout(&mut app)?,
        Commands::Profile => commands::account::profile(&app),
        Commands::Orders => commands::orders::list(&app).await,
        Commands::Claim(args) => commands::claim::claim(&mut app, args).await?,
        Commands::EditAddress { order, shipping } => {
            commands::orders::edit_address(&app, order, shipping).await?;
        }
        Commands::Language { language } => commands::settings::language(&app, language)?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_claim_args() {
        let cli = Cli::try_parse_from([
            "funnel", "claim", "--prize", "Free Sample", "--rating", "5", "--name", "Jane",
            "--phone", "5559998888", "--address", "1 Main St",
        ])
        .unwrap();

        let Commands::Claim(args) = cli.command else {
            panic!("expected claim");
        };
        assert_eq!(args.rating, 5);
        assert_eq!(args.comment, "");

        let info = prize_funnel_core::ShippingInfo::from(args.shipping);
        assert_eq!(info.name, "Jane");
        assert!(info.validate().is_ok());
    }

    #[test]
    fn test_language_arg() {
        let cli = Cli::try_parse_from(["funnel", "language", "EN"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Language {
                language: Some(Language::En)
            }
        ));
        assert!(Cli::try_parse_from(["funnel", "language", "fr"]).is_err());
    }
}
