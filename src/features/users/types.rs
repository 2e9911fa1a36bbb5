use crate::features::auth::types::UserId;
use serde::{Deserialize, Serialize};

/// One row of the public user list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
}
