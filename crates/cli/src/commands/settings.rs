//! Settings page.

use prize_funnel::FunnelApp;
use prize_funnel_core::Language;

use super::CommandError;

/// Show the language, or change it.
#[allow(clippy::print_stdout)]
pub fn language(app: &FunnelApp, language: Option<Language>) -> Result<(), CommandError> {
    match language {
        Some(language) => {
            app.set_language(language)?;
            println!("Language set to {language}");
        }
        None => println!("Language: {}", app.language()),
    }
    Ok(())
}
