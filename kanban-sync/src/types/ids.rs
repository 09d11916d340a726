//! Strongly-typed identifiers.
//!
//! Generated identifiers are ULIDs so that two clients creating entities at the
//! same moment never collide. Identifiers received from elsewhere (imports,
//! remote events, fixtures) are kept verbatim.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use ulid::Ulid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh ULID-based identifier
            pub fn new() -> Self {
                Self(Ulid::new().to_string())
            }

            /// Wrap an existing identifier string
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&$name> for $name {
            fn from(id: &$name) -> Self {
                id.clone()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifies a task
    TaskId
);
define_id!(
    /// Identifies a column
    ColumnId
);
define_id!(
    /// Identifies a swimlane
    SwimlaneId
);
define_id!(
    /// Identifies a subtask within a task
    SubtaskId
);
define_id!(
    /// Identifies a dependency edge
    DependencyId
);
define_id!(
    /// Identifies a comment
    CommentId
);
define_id!(
    /// Identifies an attachment
    AttachmentId
);
define_id!(
    /// Identifies a saved board template
    TemplateId
);
define_id!(
    /// Identifies a workflow rule
    RuleId
);
define_id!(
    /// Identifies an activity log entry
    LogEntryId
);
define_id!(
    /// Identifies a sync message on the wire
    MessageId
);
define_id!(
    /// Identifies a connected client
    ClientId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_generated_ids_are_ulids() {
        let id = TaskId::new();
        assert_eq!(id.as_str().len(), 26);
        assert_ne!(id, TaskId::new());
    }

    #[test]
    fn test_borrow_lookup() {
        let mut map = BTreeMap::new();
        map.insert(ColumnId::from("todo"), 1);
        assert_eq!(map.get("todo"), Some(&1));
    }

    #[test]
    fn test_transparent_serde() {
        let id = TaskId::from("t1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"t1\"");
        let parsed: TaskId = serde_json::from_str("\"t2\"").unwrap();
        assert_eq!(parsed.as_str(), "t2");
    }
}
