use crate::cli::{
    actions::{
        Action, account, browse,
        session::{self, Credentials},
    },
    commands::{
        ARG_API_BASE_URL, ARG_CONFIRMATION, ARG_EMAIL, ARG_LOCATION, ARG_NAME, ARG_NEW_PASSWORD,
        ARG_OLD_PASSWORD, ARG_PASSWORD, ARG_STORAGE_PATH, ARG_TOGGLE, ARG_TOKEN,
    },
    globals::GlobalArgs,
};
use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use secrecy::SecretString;

fn string(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Result<SecretString> {
    string(matches, id).map(SecretString::from)
}

fn credentials(matches: &ArgMatches) -> Result<Credentials> {
    Ok(Credentials {
        email: string(matches, ARG_EMAIL)?,
        password: secret(matches, ARG_PASSWORD)?,
    })
}

/// # Errors
/// Returns an error if the subcommand is unknown or a required argument is missing.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub) = matches.subcommand().context("missing subcommand")?;

    // global args are propagated into the subcommand matches
    let globals = GlobalArgs::new(
        sub.get_one::<String>(ARG_API_BASE_URL).cloned(),
        sub.get_one::<String>(ARG_STORAGE_PATH).cloned(),
    );

    let action = match name {
        "sign-up" => Action::Session(
            globals,
            session::Args::SignUp {
                name: string(sub, ARG_NAME)?,
                credentials: credentials(sub)?,
            },
        ),
        "activate" => Action::Session(
            globals,
            session::Args::Activate {
                token: string(sub, ARG_TOKEN)?,
            },
        ),
        "sign-in" => Action::Session(globals, session::Args::SignIn(credentials(sub)?)),
        "sign-out" => Action::Session(globals, session::Args::SignOut),
        "google" => Action::Session(globals, session::Args::Google),
        "google-callback" => Action::Session(
            globals,
            session::Args::GoogleCallback {
                location: string(sub, ARG_LOCATION)?,
            },
        ),
        "refresh" => Action::Session(globals, session::Args::Refresh),
        "keep-alive" => {
            let credentials = if sub.contains_id(ARG_EMAIL) && sub.contains_id(ARG_PASSWORD) {
                Some(credentials(sub)?)
            } else {
                None
            };
            Action::Session(globals, session::Args::KeepAlive(credentials))
        }
        "forgot-password" => Action::Account(
            globals,
            account::Args::ForgotPassword {
                email: string(sub, ARG_EMAIL)?,
            },
        ),
        "reset-password" => Action::Account(
            globals,
            account::Args::ResetPassword {
                token: string(sub, ARG_TOKEN)?,
                password: secret(sub, ARG_PASSWORD)?,
            },
        ),
        "change-name" => Action::Account(
            globals,
            account::Args::ChangeName {
                name: string(sub, ARG_NAME)?,
            },
        ),
        "change-email" => Action::Account(
            globals,
            account::Args::ChangeEmail {
                email: string(sub, ARG_EMAIL)?,
                password: secret(sub, ARG_PASSWORD)?,
            },
        ),
        "confirm-email" => Action::Account(
            globals,
            account::Args::ConfirmEmail {
                token: string(sub, ARG_TOKEN)?,
            },
        ),
        "change-password" => Action::Account(
            globals,
            account::Args::ChangePassword {
                old_password: secret(sub, ARG_OLD_PASSWORD)?,
                new_password: secret(sub, ARG_NEW_PASSWORD)?,
                confirmation: secret(sub, ARG_CONFIRMATION)?,
            },
        ),
        "whoami" => Action::Browse(globals, browse::Args::Whoami),
        "users" => Action::Browse(globals, browse::Args::Users),
        "routes" => Action::Browse(globals, browse::Args::Routes),
        "theme" => Action::Browse(
            globals,
            browse::Args::Theme {
                toggle: sub.get_flag(ARG_TOGGLE),
            },
        ),
        other => bail!("unknown command: {other}"),
    };

    Ok(action)
}
