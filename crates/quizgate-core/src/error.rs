//! Domain error types.
//!
//! These cover the recoverable, user-facing failures of the core: gate
//! violations and whitelist mutations. Storage and parsing failures travel
//! as `anyhow::Error` with context instead.

use thiserror::Error;

use crate::gate::GateState;

/// Errors raised by the access gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// A submission was attempted outside `IN_PROGRESS`.
    #[error("answers are locked: quiz is {state}")]
    AnswersLocked { state: GateState },

    /// The supplied passcode did not match.
    #[error("incorrect passcode")]
    IncorrectPasscode,

    /// An unlock was attempted while review is not locked.
    #[error("review is not locked: quiz is {state}")]
    NotLocked { state: GateState },
}

/// Errors raised when mutating the admin whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WhitelistError {
    /// The root identity can never be removed.
    #[error("{0} is a protected admin and cannot be removed")]
    ProtectedMember(String),

    /// The value is not an email address.
    #[error("not an email address: {0}")]
    InvalidEmail(String),
}
