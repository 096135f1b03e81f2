use crate::cli::actions::{auth, preferences, referentials, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Auth(args) => auth::execute(args).await,
        Action::Referentials(args) => referentials::execute(args).await,
        Action::Preferences(args) => preferences::execute(args).await,
    }
}
