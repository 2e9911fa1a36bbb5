use crate::{
    cli::{
        actions::{cancel_on_ctrl_c, finish, print_current, print_notification},
        globals::GlobalArgs,
    },
    components::form::{EMAIL, Form, NAME, PASSWORD},
    features::auth::{AuthContext, RefreshOutcome},
    routes::{
        activation::{ActivationPage, ActivationState},
        google_auth, home, sign_in, sign_up,
    },
};
use anyhow::{Result, anyhow, bail};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub enum Args {
    SignUp {
        name: String,
        credentials: Credentials,
    },
    Activate {
        token: String,
    },
    SignIn(Credentials),
    SignOut,
    Google,
    GoogleCallback {
        location: String,
    },
    Refresh,
    KeepAlive(Option<Credentials>),
}

/// Execute a session subcommand against the stored session.
/// # Errors
/// Returns an error if the flow fails; the user-facing message is printed first.
pub async fn execute(globals: &GlobalArgs, args: Args) -> Result<()> {
    let auth = globals.context()?;
    let cancel = cancel_on_ctrl_c();

    match args {
        Args::SignUp { name, credentials } => {
            let mut form = Form::sign_up();
            form.set(NAME, name)
                .set(EMAIL, credentials.email)
                .set(PASSWORD, credentials.password.expose_secret());
            let result = sign_up::submit(&auth, &mut form, &cancel).await;
            finish(&auth, &form, result)?;
        }
        Args::Activate { token } => activate(&auth, &token, &cancel).await?,
        Args::SignIn(credentials) => {
            sign_in(&auth, credentials, &cancel).await?;
            print_home(&auth);
        }
        Args::SignOut => {
            auth.logout().await;
            print_current(&auth);
        }
        Args::Google => println!("{}", google_auth::start_url(&auth)),
        Args::GoogleCallback { location } => {
            let result = google_auth::complete(&auth, &location);
            print_current(&auth);
            result?;
            print_home(&auth);
        }
        Args::Refresh => refresh(&auth).await?,
        Args::KeepAlive(credentials) => keep_alive(&auth, credentials, &cancel).await?,
    }

    Ok(())
}

async fn sign_in(
    auth: &AuthContext,
    credentials: Credentials,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut form = Form::sign_in();
    form.set(EMAIL, credentials.email)
        .set(PASSWORD, credentials.password.expose_secret());
    let result = sign_in::submit(auth, &mut form, cancel).await;
    finish(auth, &form, result)?;
    Ok(())
}

fn print_home(auth: &AuthContext) {
    match home::view(&auth.session()) {
        home::HomeView::Cabinet { greeting, email } => println!("{greeting}\n{email}"),
        home::HomeView::Anonymous { message, links } => {
            println!("{message}");
            for link in links {
                println!("  {link}");
            }
        }
    }
}

async fn activate(auth: &AuthContext, token: &str, cancel: &CancellationToken) -> Result<()> {
    let page = ActivationPage::new();
    let mut views = page.subscribe();

    let printer = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = *views.borrow_and_update();
            if let Some(message) = view.state.message() {
                println!("{message} ({}s)", view.remaining);
            }
        }
    });

    let state = page.run(auth, token, cancel).await;
    drop(page);
    let _ = printer.await;

    match state {
        ActivationState::Activated => {
            print_home(auth);
            Ok(())
        }
        ActivationState::Failed => Err(anyhow!("activation failed")),
        ActivationState::Pending => Err(anyhow!("cancelled")),
    }
}

async fn refresh(auth: &AuthContext) -> Result<()> {
    match auth.refresh_now().await {
        RefreshOutcome::Refreshed => {
            println!("Access token refreshed");
            Ok(())
        }
        RefreshOutcome::StillValid => {
            print_current(auth);
            Ok(())
        }
        RefreshOutcome::Expired => {
            print_current(auth);
            Err(anyhow!("session expired"))
        }
        RefreshOutcome::Failed(err) => {
            print_current(auth);
            Err(err.into())
        }
        RefreshOutcome::Skipped => Err(anyhow!("You are not signed in")),
    }
}

/// Stays in the foreground while the scheduler refreshes the token, echoing
/// notifications until Ctrl-C or the session ends.
async fn keep_alive(
    auth: &AuthContext,
    credentials: Option<Credentials>,
    cancel: &CancellationToken,
) -> Result<()> {
    if let Some(credentials) = credentials {
        sign_in(auth, credentials, cancel).await?;
    }

    if !auth.is_authenticated() {
        bail!("You are not signed in");
    }

    let mut sessions = auth.subscribe();
    let mut notifications = auth.notifier().subscribe();
    info!("keeping session alive");

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("keep-alive cancelled");
                return Ok(());
            }
            changed = sessions.changed() => {
                changed?;
                if !sessions.borrow_and_update().is_authenticated() {
                    print_current(auth);
                    bail!("session ended");
                }
                debug!("access token replaced");
            }
            changed = notifications.changed() => {
                changed?;
                let current = notifications.borrow_and_update().clone();
                if let Some(notification) = current {
                    print_notification(&notification);
                }
            }
        }
    }
}
