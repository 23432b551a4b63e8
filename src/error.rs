//! Error handling for the crate.
//!
//! Internally everything is an `anyhow::Error`. Errors that reach the user from a command are
//! tagged with an `ErrorType` so that callers (and tests) can tell a validation failure from a
//! remote store failure without matching on message text.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The category of a failure that is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Missing or malformed input, detected before any remote call is made.
    Validation,
    /// A uniqueness rule was violated, e.g. a second weekly entry for the same week and zone.
    Duplicate,
    /// The remote table store rejected a request or could not be reached.
    Remote,
    /// No active session, or the session lacks the role needed for the operation.
    Authorization,
    /// The data directory or its configuration file is missing or invalid.
    Config,
    /// Reading or writing a local file failed.
    Local,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

impl std::error::Error for ErrorType {}

/// Attaches an `ErrorType` to the error of a `Result`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

/// Creates a new error with `message` that is tagged with `error_type`.
pub(crate) fn public_error(error_type: ErrorType, message: impl Into<String>) -> Error {
    anyhow::Error::msg(message.into()).context(error_type)
}

/// Returns the `ErrorType` that was attached to `error`, if any.
pub fn error_type(error: &Error) -> Option<ErrorType> {
    error.downcast_ref::<ErrorType>().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_attaches_type() {
        let result: std::result::Result<(), Error> = Err(anyhow!("week is required"));
        let err = result.pub_result(ErrorType::Validation).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
        assert_eq!(format!("{err:#}"), "validation: week is required");
    }

    #[test]
    fn test_untagged_error_has_no_type() {
        let err = anyhow!("boom");
        assert_eq!(error_type(&err), None);
    }

    #[test]
    fn test_public_error() {
        let err = public_error(ErrorType::Authorization, "not authorized");
        assert_eq!(error_type(&err), Some(ErrorType::Authorization));
        assert!(format!("{err:#}").ends_with("not authorized"));
    }
}
