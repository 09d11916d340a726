//! Kanban board ordering engine with optimistic real-time sync
//!
//! This crate holds a multi-column, multi-swimlane board of tasks in memory,
//! keeps every task in exactly one slot through arbitrary drag reordering,
//! overlays search and filter views without touching canonical state, tracks
//! per-task elapsed time and inter-task dependencies, and reconciles local
//! optimistic edits against changes pushed by other clients.
//!
//! ## Overview
//!
//! - **Operations are data** - every gesture is a struct (`task::MoveTask`,
//!   `timer::StartTimer`, ...) run through [`KanbanSession::process`]
//! - **One owner** - [`KanbanSession`] owns the [`EntityStore`]; the
//!   [`BoardRuntime`] owns the session and applies events in arrival order
//! - **Last writer wins** - local mutations carry hybrid logical stamps; the
//!   remote copy wins ties and unstamped collisions, with a conflict notice
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use kanban_sync::{board::InitBoard, task::{AddTask, MoveTask}, KanbanSession, SyncConfig};
//!
//! # async fn example() -> kanban_sync::Result<()> {
//! let mut session = KanbanSession::new(SyncConfig::load()?);
//! session.process(&InitBoard::new()).await?;
//!
//! let task = session.process(&AddTask::new("Write release notes")).await?;
//! let id = task["id"].as_str().unwrap_or_default();
//! session.process(&MoveTask::to_column(id, "doing")).await?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod operation;

pub mod clock;
pub mod command;
pub mod config;
pub mod document;
mod error;
pub mod logging;
pub mod ordering;
pub mod projection;
pub mod runtime;
pub mod session;
pub mod store;
pub mod sync;
pub mod template;
pub mod types;
pub mod workflow;

// Command modules
pub mod attachment;
pub mod board;
pub mod column;
pub mod comment;
pub mod dependency;
pub mod rule;
pub mod subtask;
pub mod swimlane;
pub mod task;
pub mod timer;

#[cfg(test)]
mod test_support;

pub use command::Command;
pub use config::SyncConfig;
pub use document::BoardDocument;
pub use error::{KanbanError, Result};
pub use operation::{Execute, Operation};
pub use projection::{BoardView, ViewQuery};
pub use runtime::{BoardEvent, BoardRuntime, Notice, RuntimeHandle};
pub use session::{Change, KanbanSession, RemoteOutcome};
pub use store::EntityStore;
pub use sync::{
    ConnectionState, MemoryChannel, MemoryHub, MemoryPersistence, PersistenceApi, PushChannel,
    SyncMessage, SyncReconciler,
};

// Re-export commonly used types
pub use types::{
    ArchivedTask, Attachment, Board, Column, ColumnId, Comment, Dependency, Priority, Swimlane,
    SwimlaneId, Task, TaskId, TimerState, WorkflowRule,
};
