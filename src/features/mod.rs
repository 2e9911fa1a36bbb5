//! Domain features (auth, current user, users) and their shared logic. Pages
//! import these modules so flow code never builds requests by hand.

pub mod auth;
pub mod me;
pub mod users;
