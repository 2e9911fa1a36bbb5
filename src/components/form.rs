//! Form state and validation. Local validators run first and block the network
//! call; server field errors are written into the same per-field slots, so a
//! displayed error looks the same whichever side produced it.

use super::notification::Notifier;
use crate::app_lib::{AppError, FieldErrors};
use regex::Regex;
use std::{collections::BTreeMap, fmt, future::Future};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const EMAIL: &str = "email";
pub const PASSWORD: &str = "password";
pub const NAME: &str = "name";
pub const OLD_PASSWORD: &str = "oldPassword";
pub const NEW_PASSWORD: &str = "newPassword";
pub const CONFIRMATION: &str = "confirmation";

pub const INVALID_EMAIL: &str = "Invalid email";
pub const SHORT_PASSWORD: &str = "Password should include more than 6 characters";
pub const NAME_WITH_DIGITS: &str = "Name should not contain digits";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const REQUIRED: &str = "This field is required";

#[must_use]
pub fn validate_email(value: &str) -> Option<&'static str> {
    let valid = Regex::new(r"^\S+@\S+$").is_ok_and(|regex| regex.is_match(value));
    (!valid).then_some(INVALID_EMAIL)
}

/// Length counts characters, not bytes.
#[must_use]
pub fn validate_password(value: &str) -> Option<&'static str> {
    (value.chars().count() <= 6).then_some(SHORT_PASSWORD)
}

#[must_use]
pub fn validate_name(value: &str) -> Option<&'static str> {
    value
        .chars()
        .any(|c| c.is_ascii_digit())
        .then_some(NAME_WITH_DIGITS)
}

#[must_use]
pub fn validate_required(value: &str) -> Option<&'static str> {
    value.trim().is_empty().then_some(REQUIRED)
}

/// Validation rule attached to a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Email,
    Password,
    Name,
    Required,
    /// Must equal the value of the named field.
    Matches(&'static str),
}

struct Field {
    name: &'static str,
    rule: Rule,
    value: String,
    error: Option<String>,
}

/// Snapshot of field values handed to a submit call.
pub struct Values(BTreeMap<&'static str, String>);

impl Values {
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map_or("", String::as_str)
    }
}

/// Why a submission did not produce a result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// Local validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// The call failed; errors are already on the fields or in the notification slot.
    Failed(AppError),
    Cancelled,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Invalid(errors) => {
                formatter.write_str("Invalid input")?;
                for (field, error) in errors {
                    write!(formatter, "; {field}: {error}")?;
                }
                Ok(())
            }
            SubmitError::Failed(err) => write!(formatter, "{err}"),
            SubmitError::Cancelled => formatter.write_str("Cancelled"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Field values and errors for one form instance. Values may hold passwords;
/// no `Debug` impl.
pub struct Form {
    fields: Vec<Field>,
    pending: bool,
}

impl Form {
    #[must_use]
    pub fn new(fields: &[(&'static str, Rule)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|&(name, rule)| Field {
                    name,
                    rule,
                    value: String::new(),
                    error: None,
                })
                .collect(),
            pending: false,
        }
    }

    #[must_use]
    pub fn sign_in() -> Self {
        Self::new(&[(EMAIL, Rule::Email), (PASSWORD, Rule::Password)])
    }

    #[must_use]
    pub fn sign_up() -> Self {
        Self::new(&[
            (NAME, Rule::Name),
            (EMAIL, Rule::Email),
            (PASSWORD, Rule::Password),
        ])
    }

    #[must_use]
    pub fn forgot_password() -> Self {
        Self::new(&[(EMAIL, Rule::Email)])
    }

    #[must_use]
    pub fn reset_password() -> Self {
        Self::new(&[(PASSWORD, Rule::Password)])
    }

    #[must_use]
    pub fn change_name() -> Self {
        Self::new(&[(NAME, Rule::Name)])
    }

    #[must_use]
    pub fn change_email() -> Self {
        Self::new(&[(EMAIL, Rule::Email), (PASSWORD, Rule::Required)])
    }

    #[must_use]
    pub fn change_password() -> Self {
        Self::new(&[
            (OLD_PASSWORD, Rule::Required),
            (NEW_PASSWORD, Rule::Password),
            (CONFIRMATION, Rule::Matches(NEW_PASSWORD)),
        ])
    }

    /// Sets a field value; editing a field drops its error. Unknown fields are ignored.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        if let Some(field) = self.field_mut(name) {
            field.value = value.into();
            field.error = None;
        }
        self
    }

    #[must_use]
    pub fn value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map_or("", |field| field.value.as_str())
    }

    #[must_use]
    pub fn error(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .and_then(|field| field.error.as_deref())
    }

    /// Current field errors, local and server alike.
    #[must_use]
    pub fn errors(&self) -> FieldErrors {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .error
                    .as_ref()
                    .map(|error| (field.name.to_string(), error.clone()))
            })
            .collect()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Runs every validator, replacing previous errors. Returns `true` when all pass.
    pub fn validate(&mut self) -> bool {
        let results: Vec<Option<&'static str>> = self
            .fields
            .iter()
            .map(|field| match field.rule {
                Rule::Email => validate_email(&field.value),
                Rule::Password => validate_password(&field.value),
                Rule::Name => validate_name(&field.value),
                Rule::Required => validate_required(&field.value),
                Rule::Matches(other) => {
                    (field.value != self.value(other)).then_some(PASSWORD_MISMATCH)
                }
            })
            .collect();

        for (field, result) in self.fields.iter_mut().zip(results) {
            field.error = result.map(str::to_string);
        }

        self.fields.iter().all(|field| field.error.is_none())
    }

    /// Writes server field errors into the matching slots. Returns how many landed.
    pub fn apply_errors(&mut self, errors: &FieldErrors) -> usize {
        let mut applied = 0;
        for (name, message) in errors {
            if let Some(field) = self.field_mut(name) {
                field.error = Some(message.clone());
                applied += 1;
            }
        }
        applied
    }

    /// Empties values and errors.
    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
            field.error = None;
        }
    }

    #[must_use]
    pub fn values(&self) -> Values {
        Values(
            self.fields
                .iter()
                .map(|field| (field.name, field.value.clone()))
                .collect(),
        )
    }

    /// Validate, mark pending, call, report failures, release pending.
    ///
    /// Server field errors land on the fields; any other failure, or field
    /// errors for fields this form does not have, goes to the notification slot.
    ///
    /// # Errors
    /// Returns `SubmitError::Invalid` without calling when local validation
    /// fails, `SubmitError::Failed` when the call fails, and
    /// `SubmitError::Cancelled` when `cancel` fires first.
    pub async fn submit<T, F, Fut>(
        &mut self,
        notifier: &Notifier,
        cancel: &CancellationToken,
        call: F,
    ) -> Result<T, SubmitError>
    where
        F: FnOnce(Values) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if !self.validate() {
            debug!(fields = self.errors().len(), "form rejected locally");
            return Err(SubmitError::Invalid(self.errors()));
        }

        self.pending = true;
        let outcome = tokio::select! {
            () = cancel.cancelled() => None,
            result = call(self.values()) => Some(result),
        };
        self.pending = false;

        match outcome {
            None => Err(SubmitError::Cancelled),
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => {
                self.report(notifier, &err);
                Err(SubmitError::Failed(err))
            }
        }
    }

    fn report(&mut self, notifier: &Notifier, err: &AppError) {
        if let AppError::Fields {
            message, errors, ..
        } = err
        {
            if self.apply_errors(errors) > 0 {
                return;
            }
            notifier.error(message.clone());
            return;
        }
        notifier.error(err.user_message());
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.name == name)
    }
}
