//! Swimlane commands

mod add;
mod delete;
mod rename;

pub use add::AddSwimlane;
pub use delete::DeleteSwimlane;
pub use rename::RenameSwimlane;
