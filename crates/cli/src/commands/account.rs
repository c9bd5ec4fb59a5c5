//! Sign-in commands and the profile page.

use prize_funnel::FunnelApp;

use super::CommandError;

/// Create an account and sign in.
pub async fn register(app: &mut FunnelApp, phone: &str, password: &str) -> Result<(), CommandError> {
    let identity = app.register(phone, password).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Registered and signed in as {identity}");
    }
    Ok(())
}

/// Sign in.
pub async fn login(app: &mut FunnelApp, phone: &str, password: &str) -> Result<(), CommandError> {
    let identity = app.login(phone, password).await?;
    let state = app.user_state();

    #[allow(clippy::print_stdout)]
    {
        println!("Signed in as {identity}");
        if state.has_order() {
            println!("You have already claimed a prize; see `funnel orders`");
        } else if state.has_spun {
            println!("You won {}", state.prize.as_deref().unwrap_or("a prize"));
        }
    }
    Ok(())
}

/// Sign out.
pub fn logout(app: &mut FunnelApp) -> Result<(), CommandError> {
    app.logout()?;

    #[allow(clippy::print_stdout)]
    {
        println!("Signed out");
    }
    Ok(())
}

/// Show progress for the signed-in participant.
#[allow(clippy::print_stdout)]
pub fn profile(app: &FunnelApp) {
    let overview = app.overview();

    let Some(identity) = overview.identity else {
        println!("Not signed in");
        return;
    };

    println!("Phone:    {identity}");
    println!("Language: {}", overview.language);
    println!(
        "Prize:    {}",
        overview.prize.as_deref().unwrap_or("none yet")
    );
    if overview.rating > 0 {
        println!("Rating:   {}/5", overview.rating);
        if !overview.feedback.is_empty() {
            println!("Feedback: {}", overview.feedback);
        }
    }
    if let Some(shipping) = overview.shipping_info {
        println!("Ship to:  {}, {}", shipping.name, shipping.address);
    }
}
