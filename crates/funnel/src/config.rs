//! Funnel configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SUPABASE_URL` - Project URL (e.g., `https://abc.supabase.co`)
//! - `SUPABASE_ANON_KEY` - Public anon key sent as `apikey` and bearer token
//! - `FUNNEL_SESSION_PATH` - Local session file (default: `.prize-funnel/session.json`)
//! - `FUNNEL_LANGUAGE` - Default display language, `zh` or `en` (default: zh)
//! - `FUNNEL_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//!
//! `SUPABASE_URL` and `SUPABASE_ANON_KEY` must be set together. With neither
//! set the funnel still runs, but every remote call fails and is handled the
//! same way as an outage.

use std::collections::HashMap;
use std::path::PathBuf;

use prize_funnel_core::Language;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_PATH: &str = ".prize-funnel/session.json";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format for the CLI subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `pretty` or `json`, got `{other}`")),
        }
    }
}

/// Funnel application configuration.
#[derive(Debug, Clone)]
pub struct FunnelConfig {
    /// Remote store, if configured
    pub gateway: Option<GatewayConfig>,
    /// Where the local session (identity and language) is kept
    pub session_path: PathBuf,
    /// Language used until the participant picks one
    pub default_language: Language,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Supabase `PostgREST` connection settings.
///
/// Implements `Debug` manually to redact the key.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Project base URL
    pub url: Url,
    /// Anon key
    pub anon_key: SecretString,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl GatewayConfig {
    /// Base URL of the REST endpoint, always ending in `/rest/v1/`.
    #[must_use]
    pub fn rest_endpoint(&self) -> Url {
        let mut base = self.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("rest/v1/").unwrap_or(base)
    }

    pub(crate) fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }
}

impl FunnelConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, if only half of the
    /// Supabase settings are present, or if the anon key looks like a
    /// placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(&EnvSource::Process)
    }

    /// Load configuration from an explicit set of variables.
    ///
    /// # Errors
    ///
    /// Same as [`FunnelConfig::from_env`].
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Result<Self, ConfigError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_source(&EnvSource::Map(map))
    }

    fn from_source(env: &EnvSource) -> Result<Self, ConfigError> {
        let gateway = GatewayConfig::from_source(env)?;
        let session_path = PathBuf::from(env.get_or_default("FUNNEL_SESSION_PATH", DEFAULT_SESSION_PATH));
        let default_language = env
            .get_or_default("FUNNEL_LANGUAGE", "zh")
            .parse::<Language>()
            .map_err(|e| ConfigError::InvalidEnvVar("FUNNEL_LANGUAGE".to_string(), e))?;
        let log_format = env
            .get_or_default("FUNNEL_LOG_FORMAT", "pretty")
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::InvalidEnvVar("FUNNEL_LOG_FORMAT".to_string(), e))?;

        Ok(Self {
            gateway,
            session_path,
            default_language,
            log_format,
            sentry_dsn: env.get_optional("SENTRY_DSN"),
            sentry_environment: env.get_optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl GatewayConfig {
    fn from_source(env: &EnvSource) -> Result<Option<Self>, ConfigError> {
        let url = env.get_optional("SUPABASE_URL");
        let key = env.get_optional("SUPABASE_ANON_KEY");

        let (url, key) = match (url, key) {
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar("SUPABASE_ANON_KEY".to_string()));
            }
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("SUPABASE_URL".to_string())),
            (Some(url), Some(key)) => (url, key),
        };

        let url = Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "SUPABASE_URL".to_string(),
                format!("unsupported scheme `{}`", url.scheme()),
            ));
        }
        validate_secret_strength(&key, "SUPABASE_ANON_KEY")?;

        Ok(Some(Self {
            url,
            anon_key: SecretString::from(key),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Where variables are read from.
enum EnvSource {
    Process,
    Map(HashMap<String, String>),
}

impl EnvSource {
    /// Get an optional variable, treating blank values as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        let value = match self {
            Self::Process => std::env::var(key).ok(),
            Self::Map(map) => map.get(key).cloned(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a key is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
