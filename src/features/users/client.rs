//! Client helpers for the user list.

use super::types::UserRecord;
use crate::app_lib::{ApiClient, AppError};
use tracing::instrument;

#[instrument(skip_all)]
pub async fn list_users(api: &ApiClient) -> Result<Vec<UserRecord>, AppError> {
    api.get_json(&["users"]).await
}
