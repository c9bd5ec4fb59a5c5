//! Phone-number identity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Identity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The input contains no digits at all.
    #[error("phone number cannot be empty")]
    Empty,
}

/// Canonicalize free-form phone input.
///
/// Strips every non-digit character, then:
/// - 11 digits starting with `1` get a `+` prefix
/// - 10 digits get a `+1` prefix
/// - anything else gets a `+` prefix
///
/// Applying the formatter to its own output yields the same string.
#[must_use]
pub fn normalize_phone(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    match digits.len() {
        11 if digits.starts_with('1') => format!("+{digits}"),
        10 => format!("+1{digits}"),
        _ => format!("+{digits}"),
    }
}

/// The user's sole identifier: a normalized phone number.
///
/// Login and registration both go through [`Identity::parse`], so the same
/// human input always maps to the same identity.
///
/// ## Examples
///
/// ```
/// use prize_funnel_core::Identity;
///
/// let identity = Identity::parse("(555) 123-4567").unwrap();
/// assert_eq!(identity.as_str(), "+15551234567");
///
/// assert!(Identity::parse("").is_err());
/// assert!(Identity::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Parse and normalize an `Identity` from user input.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Empty`] if the input has no digits.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        if !s.chars().any(|c| c.is_ascii_digit()) {
            return Err(IdentityError::Empty);
        }

        Ok(Self(normalize_phone(s)))
    }

    /// Wrap a value read back from storage.
    ///
    /// Stored values were normalized when written; they are re-normalized
    /// anyway so a hand-edited store cannot produce a second spelling.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Empty`] if the stored value has no digits.
    pub fn from_stored(s: &str) -> Result<Self, IdentityError> {
        Self::parse(s)
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Identity` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The digits without the leading `+`, as shown in the login field.
    #[must_use]
    pub fn digits(&self) -> &str {
        self.0.trim_start_matches('+')
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
