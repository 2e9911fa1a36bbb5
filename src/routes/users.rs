//! Public user list.

use crate::{
    app_lib::AppError,
    features::{
        auth::AuthContext,
        users::{client, types::UserRecord},
    },
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub const USERS_FAILED_MESSAGE: &str = "Failed to get users!";
pub const NO_USERS_MESSAGE: &str = "There are no users yet";

/// Loads the user rows. Returns `None` when cancelled.
///
/// # Errors
/// Returns the request failure after posting the error notification.
pub async fn load(
    auth: &AuthContext,
    cancel: &CancellationToken,
) -> Result<Option<Vec<UserRecord>>, AppError> {
    let result = tokio::select! {
        () = cancel.cancelled() => return Ok(None),
        result = client::list_users(auth.api()) => result,
    };

    result.map(Some).inspect_err(|err| {
        warn!("Failed to get users: {err}");
        auth.notifier().error(USERS_FAILED_MESSAGE);
    })
}
