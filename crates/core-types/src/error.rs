use thiserror::Error;

/// Business-rule failures raised at the exact point of violation.
///
/// The HTTP layer maps every variant to a 400 envelope; the display text of
/// `NotFound` and `Conflict` is the message the client sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation Errors")]
    ValidationFailed(Vec<String>),
}

impl CoreError {
    /// `"<subject> not found"`, e.g. `"Driver2 not found"`.
    pub fn not_found(subject: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{subject} not found"))
    }

    /// `"<subject> is already a part of a team"`.
    pub fn already_in_team(subject: impl std::fmt::Display) -> Self {
        Self::Conflict(format!("{subject} is already a part of a team"))
    }
}
