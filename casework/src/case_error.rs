use thiserror::Error;

/// Ready-made error type for cases that do not need their own taxonomy.
///
/// The core stays generic over the error type; this enum covers the two
/// outcomes every case ends up needing: a described domain failure and the
/// cancellation a case reports after observing its own abort signal.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum CaseError {
    /// A domain failure with a message describing what went wrong.
    #[error("{0}")]
    Message(String),

    /// The case observed its cancellation signal and stopped early.
    #[error("Aborted")]
    Aborted,
}

impl CaseError {
    pub fn message(message: impl Into<String>) -> Self {
        CaseError::Message(message.into())
    }

    pub fn is_message(&self) -> bool {
        matches!(self, CaseError::Message(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, CaseError::Aborted)
    }
}
