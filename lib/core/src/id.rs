//! Strongly-typed identifiers for provider-owned entities.
//!
//! The assistant provider issues every identifier; they are opaque to us and
//! carried around verbatim. Distinct wrapper types keep a thread id from being
//! passed where a run id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a strongly-typed wrapper around an opaque provider id.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a provider-issued identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is the empty string.
            ///
            /// Whitespace is not trimmed; the provider decides whether such
            /// an id exists.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

define_id!(
    /// Identifier of the persistent assistant configuration.
    AssistantId
);

define_id!(
    /// Identifier of a conversation thread.
    ThreadId
);

define_id!(
    /// Identifier of one assistant run over a thread.
    RunId
);

define_id!(
    /// Identifier of a message within a thread.
    MessageId
);

define_id!(
    /// Identifier of a tool call requested by a run.
    ToolCallId
);
