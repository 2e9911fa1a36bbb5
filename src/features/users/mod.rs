//! Public user directory.

pub mod client;
pub mod types;
