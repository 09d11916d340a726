//! Operation traits
//!
//! Operations are structs where the fields ARE the parameters. Each one names
//! itself with a verb and a noun ("move task") and executes against a
//! context, returning a JSON result.

use async_trait::async_trait;
use serde_json::Value;

/// Self-description of an operation
pub trait Operation {
    /// The action, e.g. "move"
    fn verb(&self) -> &'static str;

    /// The thing acted on, e.g. "task"
    fn noun(&self) -> &'static str;

    /// One-line human description
    fn description(&self) -> &'static str;

    /// Whether the operation changes board state. Read-only operations are not logged.
    fn mutates(&self) -> bool {
        true
    }

    /// Canonical op string, e.g. "move task"
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Run an operation against a context
#[async_trait]
pub trait Execute<C: Send, E>: Operation + Send + Sync {
    async fn execute(&self, ctx: &mut C) -> Result<Value, E>;
}

/// Implement [`Operation`] for a command struct
macro_rules! operation {
    ($ty:ty, verb = $verb:literal, noun = $noun:literal, description = $desc:literal) => {
        operation!(@impl $ty, $verb, $noun, $desc, true);
    };
    ($ty:ty, verb = $verb:literal, noun = $noun:literal, description = $desc:literal, read_only) => {
        operation!(@impl $ty, $verb, $noun, $desc, false);
    };
    (@impl $ty:ty, $verb:literal, $noun:literal, $desc:literal, $mutates:literal) => {
        impl $crate::operation::Operation for $ty {
            fn verb(&self) -> &'static str {
                $verb
            }
            fn noun(&self) -> &'static str {
                $noun
            }
            fn description(&self) -> &'static str {
                $desc
            }
            fn mutates(&self) -> bool {
                $mutates
            }
        }
    };
}
