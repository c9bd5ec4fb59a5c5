//! Prize claims and order history.

use chrono::{DateTime, Utc};
use prize_funnel_core::{
    Identity, ORDER_NO_SUFFIX_RANGE, Order, OrderId, OrderNumber, OrderStatus, ShippingInfo,
};
use rand::Rng;

use crate::error::{FunnelError, Result};
use crate::gateway::{NewOrderRow, PersistenceGateway, ShippingPatch};

/// Generate an order number for `now`.
///
/// Best-effort unique: nothing checks the store for an existing code.
pub fn generate_order_no<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> OrderNumber {
    OrderNumber::at(now, rng.random_range(ORDER_NO_SUFFIX_RANGE))
}

/// Order service.
pub struct OrderService<'a> {
    gateway: &'a dyn PersistenceGateway,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(gateway: &'a dyn PersistenceGateway) -> Self {
        Self { gateway }
    }

    /// Create the order for a won prize with its shipping details.
    ///
    /// The order goes straight to `reviewing`. Submitting twice creates two
    /// orders.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::Unauthenticated` without an identity,
    /// `FunnelError::MissingPrize` for a blank prize, and
    /// `FunnelError::Shipping` for incomplete details, all before any remote
    /// call.
    pub async fn submit_win_and_shipping(
        &self,
        identity: Option<&Identity>,
        prize: &str,
        shipping: ShippingInfo,
    ) -> Result<Order> {
        let identity = identity.ok_or(FunnelError::Unauthenticated)?;
        let prize = prize.trim();
        if prize.is_empty() {
            return Err(FunnelError::MissingPrize);
        }
        let shipping = shipping.normalized();
        shipping.validate()?;

        let order_no = generate_order_no(Utc::now(), &mut rand::rng());
        let row = NewOrderRow::new(
            identity,
            &order_no,
            prize,
            OrderStatus::Pending.after_shipping_submitted(),
            &shipping,
        );

        let order = Order::try_from(self.gateway.insert_order(&row).await?)?;
        tracing::info!(
            identity = %identity,
            order_no = %order.order_no,
            prize = %order.prize,
            "Order created"
        );
        Ok(order)
    }

    /// All orders for the identity, newest first.
    ///
    /// Rows that cannot be read are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::Unauthenticated` without an identity, or the
    /// remote error.
    pub async fn list_orders(&self, identity: Option<&Identity>) -> Result<Vec<Order>> {
        let identity = identity.ok_or(FunnelError::Unauthenticated)?;

        let rows = self.gateway.list_orders(identity).await?;
        let orders = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                Order::try_from(row)
                    .inspect_err(|e| {
                        tracing::warn!(
                            identity = %identity,
                            order_id = id,
                            error = %e,
                            "Skipping unreadable order"
                        );
                    })
                    .ok()
            })
            .collect();
        Ok(orders)
    }

    /// Replace the shipping details of an unresolved order.
    ///
    /// A `pending` order moves to `reviewing`.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::OrderNotFound` if the order is missing or not
    /// owned by the identity, and `FunnelError::OrderLocked` once it is
    /// completed or rejected.
    pub async fn update_shipping(
        &self,
        identity: Option<&Identity>,
        order_id: OrderId,
        shipping: ShippingInfo,
    ) -> Result<Order> {
        let identity = identity.ok_or(FunnelError::Unauthenticated)?;
        let shipping = shipping.normalized();
        shipping.validate()?;

        let current = self
            .gateway
            .find_order(identity, order_id)
            .await?
            .ok_or(FunnelError::OrderNotFound(order_id))?;
        let current = Order::try_from(current)?;

        if !current.status.accepts_shipping_changes() {
            return Err(FunnelError::OrderLocked(order_id, current.status));
        }

        let patch = ShippingPatch::new(current.status.after_shipping_submitted(), &shipping);
        let order = Order::try_from(self.gateway.update_order(order_id, &patch).await?)?;
        tracing::info!(
            identity = %identity,
            order_no = %order.order_no,
            status = %order.status,
            "Order shipping updated"
        );
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::gateway::{GatewayOp, MemoryGateway};

    fn identity() -> Identity {
        Identity::parse("5551234567").unwrap()
    }

    fn shipping() -> ShippingInfo {
        ShippingInfo::new("Jane", "5559998888", "1 Main St")
    }

    #[test]
    fn test_generated_order_numbers_are_well_formed() {
        let now = Utc.timestamp_millis_opt(1_700_000_654_321).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let order_no = generate_order_no(now, &mut rng);
            assert!(order_no.is_well_formed(), "{order_no}");
            assert!(order_no.as_str().starts_with("RTD-654321"));
            let suffix: u16 = order_no.as_str()[10..].parse().unwrap();
            assert!(ORDER_NO_SUFFIX_RANGE.contains(&suffix));
        }
    }

    #[tokio::test]
    async fn test_submit_creates_reviewing_order() {
        let gateway = MemoryGateway::new();
        let orders = OrderService::new(&gateway);

        let order = orders
            .submit_win_and_shipping(Some(&identity()), "1 Month Supply Pack", shipping())
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Reviewing);
        assert!(order.order_no.is_well_formed());
        assert_eq!(order.identity, identity());
        assert_eq!(order.shipping.address, "1 Main St");
        assert_eq!(gateway.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_requires_identity_and_prize() {
        let gateway = MemoryGateway::new();
        let orders = OrderService::new(&gateway);

        assert!(matches!(
            orders.submit_win_and_shipping(None, "Prize", shipping()).await,
            Err(FunnelError::Unauthenticated)
        ));
        assert!(matches!(
            orders
                .submit_win_and_shipping(Some(&identity()), "  ", shipping())
                .await,
            Err(FunnelError::MissingPrize)
        ));
        assert!(matches!(
            orders
                .submit_win_and_shipping(
                    Some(&identity()),
                    "Prize",
                    ShippingInfo::new("Jane", "", "1 Main St")
                )
                .await,
            Err(FunnelError::Shipping(_))
        ));
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_double_submit_creates_two_orders() {
        let gateway = MemoryGateway::new();
        let orders = OrderService::new(&gateway);

        for _ in 0..2 {
            orders
                .submit_win_and_shipping(Some(&identity()), "Free Sample", shipping())
                .await
                .unwrap();
        }
        assert_eq!(gateway.orders().len(), 2);
    }

    #[tokio::test]
    async fn test_update_shipping_on_pending_order_moves_to_reviewing() {
        let gateway = MemoryGateway::new();
        let row = gateway
            .insert_order(&NewOrderRow::new(
                &identity(),
                &OrderNumber::from_parts(1_718_000_123_456, 100),
                "Free Sample",
                OrderStatus::Pending,
                &shipping(),
            ))
            .await
            .unwrap();
        let orders = OrderService::new(&gateway);

        let updated = orders
            .update_shipping(
                Some(&identity()),
                OrderId::new(row.id),
                ShippingInfo::new("Jane", "5559998888", "2 Oak Ave"),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Reviewing);
        assert_eq!(updated.shipping.address, "2 Oak Ave");
    }

    #[tokio::test]
    async fn test_update_shipping_rejected_once_resolved() {
        let gateway = MemoryGateway::new();
        let orders = OrderService::new(&gateway);
        let order = orders
            .submit_win_and_shipping(Some(&identity()), "Free Sample", shipping())
            .await
            .unwrap();
        gateway.set_order_status(order.id, OrderStatus::Completed);

        let err = orders
            .update_shipping(Some(&identity()), order.id, shipping())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FunnelError::OrderLocked(_, OrderStatus::Completed)
        ));
        assert_eq!(gateway.calls(GatewayOp::UpdateOrder), 0);
    }

    #[tokio::test]
    async fn test_update_shipping_for_someone_elses_order() {
        let gateway = MemoryGateway::new();
        let orders = OrderService::new(&gateway);
        let order = orders
            .submit_win_and_shipping(Some(&identity()), "Free Sample", shipping())
            .await
            .unwrap();

        let stranger = Identity::parse("5550000000").unwrap();
        let err = orders
            .update_shipping(Some(&stranger), order.id, shipping())
            .await
            .unwrap_err();
        assert!(matches!(err, FunnelError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let gateway = MemoryGateway::new();
        let orders = OrderService::new(&gateway);
        for prize in ["first", "second"] {
            orders
                .submit_win_and_shipping(Some(&identity()), prize, shipping())
                .await
                .unwrap();
        }

        let listed = orders.list_orders(Some(&identity())).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].prize, "second");
    }

    #[tokio::test]
    async fn test_list_orders_skips_unreadable_rows() {
        let gateway = MemoryGateway::new();
        let orders = OrderService::new(&gateway);
        for prize in ["first", "second"] {
            orders
                .submit_win_and_shipping(Some(&identity()), prize, shipping())
                .await
                .unwrap();
        }
        let mut row = NewOrderRow::new(
            &identity(),
            &OrderNumber::from_parts(1_718_000_123_456, 100),
            "third",
            OrderStatus::Reviewing,
            &shipping(),
        );
        row.status = "shipped".to_string();
        gateway.insert_order(&row).await.unwrap();

        let listed = orders.list_orders(Some(&identity())).await.unwrap();
        let prizes: Vec<&str> = listed.iter().map(|o| o.prize.as_str()).collect();
        assert_eq!(prizes, ["second", "first"]);
    }
}
