//! Shipping recipient details.

use serde::{Deserialize, Serialize};

/// Errors raised when shipping details are incomplete.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShippingError {
    /// A mandatory field is empty or whitespace.
    #[error("shipping field `{0}` is required")]
    MissingField(&'static str),
}

/// Free-form recipient data collected by the shipping form.
///
/// Only `name`, `phone`, and `address` are mandatory. Everything else is
/// passed through as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    /// Recipient full name.
    pub name: String,
    /// Recipient contact phone (not normalized, not the session identity).
    pub phone: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    /// Street address line.
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ShippingInfo {
    /// Create shipping info with just the mandatory fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Check that the mandatory fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingError::MissingField`] naming the first empty field.
    pub fn validate(&self) -> Result<(), ShippingError> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ShippingError::MissingField(field));
            }
        }

        Ok(())
    }

    /// Whether the form may be submitted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// Trim every field and collapse blank optional fields to `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn optional(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        }

        Self {
            name: self.name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            province: self.province.trim().to_owned(),
            city: self.city.trim().to_owned(),
            address: self.address.trim().to_owned(),
            address2: optional(self.address2),
            zip_code: self.zip_code.trim().to_owned(),
            initials: optional(self.initials),
            location: optional(self.location),
        }
    }
}
