use crate::cli::actions::{Action, account, browse, session};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Session(globals, args) => session::execute(&globals, args).await,
        Action::Account(globals, args) => account::execute(&globals, args).await,
        Action::Browse(globals, args) => browse::execute(&globals, args).await,
    }
}
