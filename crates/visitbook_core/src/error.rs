use std::fmt;

/// Local input rejection, raised before any effect is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    EmptyMessage,
    NameTooLong { max: usize },
    MessageTooLong { max: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "name is empty"),
            ValidationError::EmptyMessage => write!(f, "message is empty"),
            ValidationError::NameTooLong { max } => write!(f, "name longer than {max} characters"),
            ValidationError::MessageTooLong { max } => {
                write!(f, "message longer than {max} characters")
            }
        }
    }
}

/// Failure markers held in state. None of these propagate as panics; the
/// rendering side only ever sees `user_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// The persistence collaborator was never configured.
    NotConfigured,
    /// A read from the collaborator failed (transport or backend).
    FetchFailed,
    /// A write to the collaborator failed.
    SubmitFailed,
    Validation(ValidationError),
}

impl SyncError {
    /// Static, non-technical message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            SyncError::NotConfigured => "This feature is not available right now.",
            SyncError::FetchFailed => "Could not load the latest data.",
            SyncError::SubmitFailed => "Could not save your entry. Please try again.",
            SyncError::Validation(ValidationError::EmptyName) => "Please enter your name.",
            SyncError::Validation(ValidationError::EmptyMessage) => "Please enter a message.",
            SyncError::Validation(ValidationError::NameTooLong { .. }) => "Name is too long.",
            SyncError::Validation(ValidationError::MessageTooLong { .. }) => "Message is too long.",
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::NotConfigured => write!(f, "store not configured"),
            SyncError::FetchFailed => write!(f, "fetch failed"),
            SyncError::SubmitFailed => write!(f, "submit failed"),
            SyncError::Validation(err) => write!(f, "validation: {err}"),
        }
    }
}
