//! Home page. Nothing is gated; the page renders differently per session state.

use crate::features::auth::types::Session;

pub const NO_CABINET_MESSAGE: &str = "You don't have a cabinet yet";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HomeView {
    /// Greeting plus the signed-in email.
    Cabinet { greeting: String, email: String },
    /// Prompt with links to sign up or sign in.
    Anonymous { message: &'static str, links: [&'static str; 2] },
}

/// Partial sessions render as anonymous.
#[must_use]
pub fn view(session: &Session) -> HomeView {
    match (session.is_authenticated(), session.name(), session.email()) {
        (true, Some(name), Some(email)) => HomeView::Cabinet {
            greeting: format!("Welcome {name}!"),
            email: email.to_string(),
        },
        _ => HomeView::Anonymous {
            message: NO_CABINET_MESSAGE,
            links: ["/sign-up", "/sign-in"],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::types::User;

    #[test]
    fn greets_signed_in_user() {
        let session = Session::new(
            User {
                id: Some(1),
                name: Some("A".to_string()),
                email: Some("a@b.com".to_string()),
            },
            "tok1",
        );
        assert_eq!(
            view(&session),
            HomeView::Cabinet {
                greeting: "Welcome A!".to_string(),
                email: "a@b.com".to_string(),
            }
        );
    }

    #[test]
    fn partial_session_is_anonymous() {
        let session = Session {
            user: Some(User {
                id: Some(1),
                name: Some("A".to_string()),
                email: None,
            }),
            access_token: Some("tok1".to_string()),
        };
        assert!(matches!(view(&session), HomeView::Anonymous { .. }));
        assert!(matches!(
            view(&Session::default()),
            HomeView::Anonymous {
                message: NO_CABINET_MESSAGE,
                ..
            }
        ));
    }
}
