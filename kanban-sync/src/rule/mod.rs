//! Workflow rule commands

mod add;
mod remove;

pub use add::AddRule;
pub use remove::RemoveRule;
