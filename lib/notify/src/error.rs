//! Error types for the notify crate.

use std::fmt;

/// Errors from sending a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The notifier could not be built from its configuration.
    InvalidConfig { reason: String },
    /// The request never produced a response.
    Transport { reason: String },
    /// The messaging service rejected the message.
    Rejected { status: u16, body: String },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid notifier configuration: {reason}"),
            Self::Transport { reason } => write!(f, "messaging service unreachable: {reason}"),
            Self::Rejected { status, body } => {
                write!(f, "messaging service returned {status}: {body}")
            }
        }
    }
}

impl std::error::Error for NotifyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_includes_status() {
        let err = NotifyError::Rejected {
            status: 401,
            body: "bad token".to_string(),
        };
        assert_eq!(err.to_string(), "messaging service returned 401: bad token");
    }
}
