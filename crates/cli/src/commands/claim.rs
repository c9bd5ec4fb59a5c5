//! Run the spin, rating, and shipping steps in one command.

use clap::Args;
use prize_funnel::{FunnelApp, FunnelError, Step};
use prize_funnel_core::Rating;

use super::{CommandError, ShippingArgs};

/// Arguments for `funnel claim`.
#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Prize the wheel landed on
    #[arg(long)]
    pub prize: String,

    /// Star rating, 1 to 5
    #[arg(long)]
    pub rating: u8,

    /// Comment; ratings of 3 or less need at least 15 characters
    #[arg(long, default_value = "")]
    pub comment: String,

    #[command(flatten)]
    pub shipping: ShippingArgs,
}

/// Claim a prize for the signed-in participant.
///
/// Waits for both remote writes so their outcome can be reported, but a
/// failed write does not fail the command.
#[allow(clippy::print_stdout)]
pub async fn claim(app: &mut FunnelApp, args: ClaimArgs) -> Result<(), CommandError> {
    if app.identity().is_none() {
        return Err(FunnelError::Unauthenticated.into());
    }

    app.reset();
    if app.advance() != Step::Game {
        return Err(FunnelError::Unauthenticated.into());
    }

    app.on_win(&args.prize);

    let rating = app.on_feedback(args.rating, &args.comment)?;
    let operation = rating.operation();
    if rating.settled().await.is_none() {
        tracing::warn!(operation, "Rating not stored");
        println!("Your rating could not be saved");
    } else if Rating::new(args.rating).is_ok_and(Rating::is_positive) {
        println!("Thanks! Please consider leaving us a public review.");
    }

    let order = app.on_shipping(args.shipping.into())?;
    let operation = order.operation();
    match order.settled().await {
        Some(order) => {
            println!("Order {} placed for {}", order.order_no, order.prize);
            println!("Status: {}", order.status);
        }
        None => {
            tracing::warn!(operation, "Order not stored");
            println!("Your order could not be saved; please try again later");
        }
    }

    debug_assert_eq!(app.step(), Step::Success);
    Ok(())
}
