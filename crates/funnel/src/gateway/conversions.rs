//! Mapping between remote rows and domain types.
//!
//! This is the only place that knows `name` holds the identity on an order,
//! `state` holds the province, and `address1` the street line.

use prize_funnel_core::{
    Feedback, Identity, Order, OrderId, OrderNumber, OrderStatus, Rating, ShippingInfo, Tracking,
};

use super::GatewayError;
use super::rows::{FeedbackRow, NewFeedbackRow, NewOrderRow, OrderRow, ShippingColumns, ShippingPatch};

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl From<&ShippingInfo> for ShippingColumns {
    fn from(info: &ShippingInfo) -> Self {
        Self {
            full_name: non_blank(&info.name),
            phone: non_blank(&info.phone),
            initials: info.initials.as_deref().and_then(non_blank),
            location: info.location.as_deref().and_then(non_blank),
            address1: non_blank(&info.address),
            address2: info.address2.as_deref().and_then(non_blank),
            city: non_blank(&info.city),
            state: non_blank(&info.province),
            zip: non_blank(&info.zip_code),
        }
    }
}

impl From<ShippingColumns> for ShippingInfo {
    fn from(columns: ShippingColumns) -> Self {
        Self {
            name: columns.full_name.unwrap_or_default(),
            phone: columns.phone.unwrap_or_default(),
            province: columns.state.unwrap_or_default(),
            city: columns.city.unwrap_or_default(),
            address: columns.address1.unwrap_or_default(),
            address2: columns.address2,
            zip_code: columns.zip.unwrap_or_default(),
            initials: columns.initials,
            location: columns.location,
        }
    }
}

impl NewOrderRow {
    /// Build the insert payload for a claimed prize.
    #[must_use]
    pub fn new(
        identity: &Identity,
        order_no: &OrderNumber,
        prize: &str,
        status: OrderStatus,
        shipping: &ShippingInfo,
    ) -> Self {
        Self {
            order_no: order_no.as_str().to_owned(),
            name: identity.as_str().to_owned(),
            prize: prize.to_owned(),
            status: status.to_string(),
            shipping: shipping.into(),
        }
    }
}

impl ShippingPatch {
    /// Build the update payload for an address change.
    #[must_use]
    pub fn new(status: OrderStatus, shipping: &ShippingInfo) -> Self {
        Self {
            status: status.to_string(),
            shipping: shipping.into(),
        }
    }
}

impl NewFeedbackRow {
    /// Build the insert payload for a rating.
    ///
    /// Both `phone` and `user` carry the identity.
    #[must_use]
    pub fn new(identity: &Identity, rating: Rating, comment: &str, date: String) -> Self {
        Self {
            phone: identity.as_str().to_owned(),
            user: identity.as_str().to_owned(),
            rating: i16::from(rating.stars()),
            comment: comment.to_owned(),
            date,
        }
    }
}

impl OrderRow {
    /// The prize and shipping details, read without checking the status.
    ///
    /// Enough to rebuild local progress when the row is otherwise unreadable.
    #[must_use]
    pub fn into_claim(self) -> (String, ShippingInfo) {
        (self.prize.unwrap_or_default(), self.shipping.into())
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = GatewayError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let identity = Identity::from_stored(&row.name).map_err(|e| {
            GatewayError::DataCorruption(format!("order {} has invalid owner: {e}", row.id))
        })?;
        let status = row
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(|e| GatewayError::DataCorruption(format!("order {}: {e}", row.id)))?
            .unwrap_or_default();

        let tracking = Tracking {
            carrier: row.carrier,
            tracking_no: row.tracking_no,
            ship_date: row.ship_date,
        };

        Ok(Self {
            id: OrderId::new(row.id),
            order_no: OrderNumber::from(row.order_no.unwrap_or_default()),
            identity,
            prize: row.prize.unwrap_or_default(),
            status,
            shipping: row.shipping.into(),
            rejection_reason: row.rejection_reason,
            tracking: (!tracking.is_empty()).then_some(tracking),
            created_at: row.created_at,
        })
    }
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = GatewayError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        let identity = Identity::from_stored(&row.user)
            .map_err(|e| GatewayError::DataCorruption(format!("feedback has invalid user: {e}")))?;
        let rating = u8::try_from(row.rating)
            .ok()
            .and_then(|stars| Rating::new(stars).ok())
            .ok_or_else(|| {
                GatewayError::DataCorruption(format!("feedback has invalid rating {}", row.rating))
            })?;

        Ok(Self {
            identity,
            rating,
            comment: row.comment.unwrap_or_default(),
            date: row.date,
            created_at: row.created_at,
        })
    }
}
