//! Core types for the kanban engine

mod archive;
mod board;
mod dependency;
mod ids;
mod log;
mod task;
mod timer;
mod workflow;

// Re-export all types
pub use archive::ArchivedTask;
pub use board::{Board, Column, Swimlane};
pub use dependency::Dependency;
pub use ids::{
    AttachmentId, ClientId, ColumnId, CommentId, DependencyId, LogEntryId, MessageId, RuleId,
    SubtaskId, SwimlaneId, TaskId, TemplateId,
};
pub use log::LogEntry;
pub use task::{Attachment, Comment, Priority, Subtask, Task};
pub use timer::TimerState;
pub use workflow::{RuleAction, RuleCondition, WorkflowRule};
