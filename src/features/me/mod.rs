//! Current-user updates. Every call here is protected and reads the bearer
//! token from the session store right before sending.

pub mod client;
pub mod types;
