pub mod auth;
pub mod preferences;
pub mod referentials;

// Internal "interpreter" for `Action`.
// The match lives in a separate module so `mod.rs` stays small.
mod run;

#[derive(Debug)]
pub enum Action {
    Auth(auth::Args),
    Referentials(referentials::Args),
    Preferences(preferences::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
