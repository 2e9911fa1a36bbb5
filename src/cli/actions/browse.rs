use crate::{
    cli::{actions::cancel_on_ctrl_c, globals::GlobalArgs},
    features::{auth::AuthContext, users::types::UserRecord},
    routes::{
        home::{self, HomeView},
        users::{self, NO_USERS_MESSAGE, USERS_FAILED_MESSAGE},
    },
};
use anyhow::{Result, anyhow};

#[derive(Debug, PartialEq, Eq)]
pub enum Args {
    Whoami,
    Users,
    Routes,
    Theme { toggle: bool },
}

/// Execute a read-only subcommand.
/// # Errors
/// Returns an error if the store or the user list cannot be read.
pub async fn execute(globals: &GlobalArgs, args: Args) -> Result<()> {
    match args {
        Args::Whoami => {
            let auth = globals.context()?;
            for line in home_lines(&home::view(&auth.session())) {
                println!("{line}");
            }
        }
        Args::Users => {
            let auth = globals.context()?;
            list_users(&auth).await?;
        }
        Args::Routes => {
            let auth = globals.context()?;
            for pattern in auth.navigator().navigable_patterns() {
                println!("{pattern}");
            }
        }
        Args::Theme { toggle } => {
            let themes = globals.theme()?;
            let theme = if toggle {
                themes.toggle()?
            } else {
                themes.load()
            };
            println!("{theme}");
        }
    }

    Ok(())
}

fn home_lines(view: &HomeView) -> Vec<String> {
    match view {
        HomeView::Cabinet { greeting, email } => vec![greeting.clone(), email.clone()],
        HomeView::Anonymous { message, links } => std::iter::once((*message).to_string())
            .chain(links.iter().map(|link| format!("  {link}")))
            .collect(),
    }
}

fn user_row(user: &UserRecord) -> String {
    format!(
        "{}\t{}\t{}",
        user.id,
        user.name.as_deref().unwrap_or("-"),
        user.email
    )
}

async fn list_users(auth: &AuthContext) -> Result<()> {
    let cancel = cancel_on_ctrl_c();
    match users::load(auth, &cancel).await {
        Ok(Some(rows)) if rows.is_empty() => println!("{NO_USERS_MESSAGE}"),
        Ok(Some(rows)) => {
            for row in &rows {
                println!("{}", user_row(row));
            }
        }
        Ok(None) => return Err(anyhow!("cancelled")),
        Err(err) => {
            eprintln!("error: {USERS_FAILED_MESSAGE}");
            return Err(err.into());
        }
    }
    Ok(())
}
