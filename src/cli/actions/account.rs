use crate::{
    cli::{
        actions::{cancel_on_ctrl_c, finish, print_current},
        globals::GlobalArgs,
    },
    components::form::{CONFIRMATION, EMAIL, Form, NAME, NEW_PASSWORD, OLD_PASSWORD, PASSWORD},
    routes::{
        account,
        confirmation::{self, ConfirmationOutcome},
        forgot_password, reset_password,
    },
};
use anyhow::{Result, anyhow};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub enum Args {
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: String,
        password: SecretString,
    },
    ChangeName {
        name: String,
    },
    ChangeEmail {
        email: String,
        password: SecretString,
    },
    ConfirmEmail {
        token: String,
    },
    ChangePassword {
        old_password: SecretString,
        new_password: SecretString,
        confirmation: SecretString,
    },
}

/// Execute an account subcommand.
/// # Errors
/// Returns an error if the flow fails; the user-facing message is printed first.
pub async fn execute(globals: &GlobalArgs, args: Args) -> Result<()> {
    let auth = globals.context()?;
    let cancel = cancel_on_ctrl_c();

    match args {
        Args::ForgotPassword { email } => {
            let mut form = Form::forgot_password();
            form.set(EMAIL, email);
            let result = forgot_password::submit(&auth, &mut form, &cancel).await;
            finish(&auth, &form, result)?;
        }
        Args::ResetPassword { token, password } => {
            let mut form = Form::reset_password();
            form.set(PASSWORD, password.expose_secret());
            let result = reset_password::submit(&auth, &token, &mut form, &cancel).await;
            finish(&auth, &form, result)?;
        }
        Args::ChangeName { name } => {
            let mut form = Form::change_name();
            form.set(NAME, name);
            let result = account::change_name(&auth, &mut form, &cancel).await;
            finish(&auth, &form, result)?;
        }
        Args::ChangeEmail { email, password } => {
            let mut form = Form::change_email();
            form.set(EMAIL, email)
                .set(PASSWORD, password.expose_secret());
            let result = account::request_email_change(&auth, &mut form, &cancel).await;
            finish(&auth, &form, result)?;
        }
        Args::ConfirmEmail { token } => match confirmation::run(&auth, &token, &cancel).await {
            ConfirmationOutcome::Confirmed(email) => println!("Email changed to {email}"),
            ConfirmationOutcome::Rejected(err) => {
                print_current(&auth);
                return Err(err.into());
            }
            ConfirmationOutcome::Cancelled => return Err(anyhow!("cancelled")),
        },
        Args::ChangePassword {
            old_password,
            new_password,
            confirmation,
        } => {
            let mut form = Form::change_password();
            form.set(OLD_PASSWORD, old_password.expose_secret())
                .set(NEW_PASSWORD, new_password.expose_secret())
                .set(CONFIRMATION, confirmation.expose_secret());
            let result = account::change_password(&auth, &mut form, &cancel).await;
            finish(&auth, &form, result)?;
        }
    }

    Ok(())
}
