//! Shared building blocks used by every page: the notification slot and form state.

pub mod form;
pub mod notification;

pub use form::{Form, Rule, SubmitError, Values};
pub use notification::{Notification, Notifier};
