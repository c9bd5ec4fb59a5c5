//! Row shapes exactly as `PostgREST` sends and receives them.
//!
//! Column names follow the remote schema, not the domain types. Nullable
//! columns are `Option`. See `conversions` for the mapping.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Table names.
pub(crate) mod tables {
    pub const USERS: &str = "app_users";
    pub const ORDERS: &str = "orders";
    pub const FEEDBACKS: &str = "feedbacks";
}

/// `app_users` row, selected without the password column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub phone: String,
}

/// Recipient columns shared by order inserts, updates, and reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingColumns {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub initials: Option<String>,
    pub location: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// `orders` insert payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrderRow {
    pub order_no: String,
    /// The owner's identity.
    pub name: String,
    pub prize: String,
    pub status: String,
    #[serde(flatten)]
    pub shipping: ShippingColumns,
}

/// `orders` row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: i64,
    pub order_no: Option<String>,
    pub name: String,
    pub prize: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub shipping: ShippingColumns,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking_no: Option<String>,
    #[serde(default)]
    pub ship_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// `orders` update payload for an address change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingPatch {
    pub status: String,
    #[serde(flatten)]
    pub shipping: ShippingColumns,
}

/// `feedbacks` insert payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFeedbackRow {
    pub phone: String,
    /// The author's identity.
    pub user: String,
    pub rating: i16,
    pub comment: String,
    pub date: String,
}

/// `feedbacks` row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRow {
    pub phone: Option<String>,
    pub user: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub date: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_row_flattens_shipping_columns() {
        let row = NewOrderRow {
            order_no: "RTD-123456789".to_string(),
            name: "+15551234567".to_string(),
            prize: "1 Month Supply Pack".to_string(),
            status: "reviewing".to_string(),
            shipping: ShippingColumns {
                full_name: Some("Jane".to_string()),
                address1: Some("1 Main St".to_string()),
                ..ShippingColumns::default()
            },
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["name"], "+15551234567");
        assert_eq!(json["full_name"], "Jane");
        assert_eq!(json["address1"], "1 Main St");
        assert!(json.get("shipping").is_none());
    }

    #[test]
    fn test_order_row_deserializes_postgrest_payload() {
        let json = r#"{
            "id": 7,
            "order_no": "RTD-123456789",
            "name": "+15551234567",
            "full_name": "Jane",
            "phone": "5559998888",
            "initials": null,
            "location": null,
            "address1": "1 Main St",
            "address2": null,
            "city": "Springfield",
            "state": "IL",
            "zip": "62701",
            "prize": "1 Month Supply Pack",
            "status": "completed",
            "rejection_reason": null,
            "carrier": "UPS",
            "tracking_no": "1Z999",
            "ship_date": "2024-06-02",
            "created_at": "2024-06-01T12:30:00.123456+00:00"
        }"#;

        let row: OrderRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.id, 7);
        assert_eq!(row.shipping.state.as_deref(), Some("IL"));
        assert_eq!(row.carrier.as_deref(), Some("UPS"));
        assert_eq!(row.ship_date, NaiveDate::from_ymd_opt(2024, 6, 2));
    }

    #[test]
    fn test_order_row_tolerates_missing_tracking_columns() {
        let json = r#"{
            "id": 1,
            "order_no": null,
            "name": "+15551234567",
            "prize": "Free Sample",
            "status": "pending",
            "created_at": "2024-06-01T12:30:00Z"
        }"#;

        let row: OrderRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.tracking_no, None);
        assert_eq!(row.shipping, ShippingColumns::default());
    }
}
