//! Order history and address changes.

use prize_funnel::FunnelApp;
use prize_funnel_core::{Order, OrderId};

use super::{CommandError, ShippingArgs};

fn summary(order: &Order) -> String {
    format!(
        "#{} {} {} [{}] {}",
        order.id,
        order.order_no,
        order.prize,
        order.status,
        order.created_at.format("%Y-%m-%d")
    )
}

/// List orders, newest first.
#[allow(clippy::print_stdout)]
pub async fn list(app: &FunnelApp) {
    if app.identity().is_none() {
        println!("Not signed in");
        return;
    }

    let orders = app.orders().await;
    if orders.is_empty() {
        println!("No orders");
        return;
    }

    for order in &orders {
        println!("{}", summary(order));
        if let Some(reason) = &order.rejection_reason {
            println!("    Rejected: {reason}");
        }
        if let Some(tracking) = &order.tracking {
            println!(
                "    Shipped via {} {}",
                tracking.carrier.as_deref().unwrap_or("carrier"),
                tracking.tracking_no.as_deref().unwrap_or("")
            );
        }
    }
}

/// Replace the shipping details of an open order.
pub async fn edit_address(
    app: &FunnelApp,
    order: i64,
    shipping: ShippingArgs,
) -> Result<(), CommandError> {
    let order = app
        .update_order_shipping(OrderId::new(order), shipping.into())
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Order {} will ship to {}, {} [{}]",
            order.order_no, order.shipping.name, order.shipping.address, order.status
        );
    }
    Ok(())
}
