pub mod account;
pub mod browse;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::{
    components::{
        form::{Form, SubmitError},
        notification::Notification,
    },
    features::auth::AuthContext,
};
use anyhow::{Result, anyhow};
use tokio_util::sync::CancellationToken;

use super::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Session(GlobalArgs, session::Args),
    Account(GlobalArgs, account::Args),
    Browse(GlobalArgs, browse::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Token cancelled on Ctrl-C; page flows stop at their next await point.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    token
}

pub(crate) fn print_notification(notification: &Notification) {
    if notification.error {
        eprintln!("error: {}", notification.message);
    } else {
        println!("{}", notification.message);
    }
}

pub(crate) fn print_current(auth: &AuthContext) {
    if let Some(notification) = auth.notifier().current() {
        print_notification(&notification);
    }
}

/// Prints what a form flow left behind and turns a `SubmitError` into a CLI error.
pub(crate) fn finish<T>(
    auth: &AuthContext,
    form: &Form,
    result: Result<T, SubmitError>,
) -> Result<T> {
    print_current(auth);

    match result {
        Ok(value) => Ok(value),
        Err(SubmitError::Invalid(errors)) => {
            for (field, error) in &errors {
                eprintln!("{field}: {error}");
            }
            Err(anyhow!("invalid input"))
        }
        Err(SubmitError::Failed(err)) => {
            for (field, error) in &form.errors() {
                eprintln!("{field}: {error}");
            }
            Err(anyhow!(err))
        }
        Err(SubmitError::Cancelled) => Err(anyhow!("cancelled")),
    }
}
