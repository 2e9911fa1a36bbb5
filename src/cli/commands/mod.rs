pub mod logging;

use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_API_BASE_URL: &str = "api-base-url";
pub const ARG_STORAGE_PATH: &str = "storage-path";
pub const ARG_NAME: &str = "name";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_TOKEN: &str = "token";
pub const ARG_LOCATION: &str = "location";
pub const ARG_OLD_PASSWORD: &str = "old-password";
pub const ARG_NEW_PASSWORD: &str = "new-password";
pub const ARG_CONFIRMATION: &str = "confirmation";
pub const ARG_TOGGLE: &str = "toggle";

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long("email")
        .help("Account email")
        .env("CABINET_EMAIL")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long("password")
        .help("Account password")
        .env("CABINET_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn token_arg(help: &'static str) -> Arg {
    Arg::new(ARG_TOKEN).help(help).required(true)
}

fn subcommands() -> Vec<Command> {
    vec![
        Command::new("sign-up")
            .about("Create an account; an activation link is emailed")
            .arg(
                Arg::new(ARG_NAME)
                    .short('n')
                    .long("name")
                    .help("Display name")
                    .required(true),
            )
            .arg(email_arg())
            .arg(password_arg()),
        Command::new("activate")
            .about("Activate an account from the emailed token")
            .arg(token_arg("Activation token")),
        Command::new("sign-in")
            .about("Sign in with email and password")
            .arg(email_arg())
            .arg(password_arg()),
        Command::new("sign-out").about("Sign out and forget the stored session"),
        Command::new("whoami").about("Show the home page for the stored session"),
        Command::new("users").about("List users"),
        Command::new("forgot-password")
            .about("Email a password reset link")
            .arg(email_arg()),
        Command::new("reset-password")
            .about("Set a new password with the emailed reset token")
            .arg(token_arg("Reset token"))
            .arg(password_arg()),
        Command::new("change-name")
            .about("Rename the signed-in user")
            .arg(Arg::new(ARG_NAME).help("New display name").required(true)),
        Command::new("change-email")
            .about("Request an email change; a confirmation link is sent")
            .arg(email_arg().help("New email"))
            .arg(password_arg()),
        Command::new("confirm-email")
            .about("Confirm an email change with the emailed token")
            .arg(token_arg("Confirmation token")),
        Command::new("change-password")
            .about("Change the password of the signed-in user")
            .arg(
                Arg::new(ARG_OLD_PASSWORD)
                    .long("old-password")
                    .help("Current password")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_NEW_PASSWORD)
                    .long("new-password")
                    .help("New password")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_CONFIRMATION)
                    .long("confirmation")
                    .help("New password again")
                    .required(true),
            ),
        Command::new("google").about("Print the URL that starts Google sign-in"),
        Command::new("google-callback")
            .about("Complete Google sign-in from the redirect URL")
            .arg(
                Arg::new(ARG_LOCATION)
                    .help("Redirect URL carrying the session fragment")
                    .required(true),
            ),
        Command::new("refresh").about("Refresh the access token once"),
        Command::new("keep-alive")
            .about("Stay signed in, refreshing the access token every 31 minutes")
            .long_about(
                "Stay signed in, refreshing the access token every 31 minutes. The refresh \
                 cookie lives in this process only; pass --email and --password to sign in \
                 first so the server can accept the refreshes.",
            )
            .arg(email_arg().required(false))
            .arg(password_arg().required(false).requires(ARG_EMAIL)),
        Command::new("routes").about("List the routes reachable in the current session"),
        Command::new("theme")
            .about("Show the theme preference")
            .arg(
                Arg::new(ARG_TOGGLE)
                    .long("toggle")
                    .help("Switch between light and dark")
                    .action(ArgAction::SetTrue),
            ),
    ]
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("cabinet")
        .about("User account client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_BASE_URL)
                .short('u')
                .long("api-base-url")
                .help("Base URL of the auth API")
                .default_value(crate::app_lib::config::DEFAULT_API_BASE_URL)
                .env("CABINET_API_BASE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STORAGE_PATH)
                .short('s')
                .long("storage-path")
                .help("JSON file holding the session and preferences")
                .env("CABINET_STORAGE_PATH")
                .global(true),
        )
        .subcommands(subcommands());

    logging::with_args(command)
}
