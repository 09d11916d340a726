//! Commands as data.
//!
//! [`Command`] wraps every operation in one enum tagged by its op string, so a
//! gesture can be queued, logged or sent over a wire and executed later:
//!
//! ```json
//! { "op": "move task", "id": "01J...", "to": "done", "index": 0 }
//! ```

use crate::attachment::{AddAttachment, ListAttachments};
use crate::board::{ExportBoard, GetBoard, ImportBoard, InitBoard};
use crate::column::{AddColumn, DeleteColumn, MoveColumn, RenameColumn};
use crate::comment::{AddComment, ListComments};
use crate::dependency::{AddDependency, DeleteDependency, ListDependencies};
use crate::error::{KanbanError, Result};
use crate::operation::Operation;
use crate::rule::{AddRule, RemoveRule};
use crate::session::KanbanSession;
use crate::subtask::{AddSubtask, DeleteSubtask, ToggleSubtask};
use crate::swimlane::{AddSwimlane, DeleteSwimlane, RenameSwimlane};
use crate::task::{
    AddTask, ArchiveTask, DeleteTask, GetTask, ListArchived, MoveTask, UnarchiveTask, UpdateTask,
};
use crate::template::{DeleteTemplate, ListTemplates, LoadTemplate, SaveTemplate};
use crate::timer::{GetElapsed, ResetTimer, StartTimer, StopTimer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! commands {
    ($($variant:ident($ty:ty) => $op:literal,)*) => {
        /// Any operation, tagged by `op`
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(tag = "op")]
        pub enum Command {
            $(
                #[serde(rename = $op)]
                $variant($ty),
            )*
        }

        impl Command {
            /// Run through [`KanbanSession::process`]
            pub async fn execute(&self, session: &mut KanbanSession) -> Result<Value> {
                match self {
                    $(Self::$variant(op) => session.process(op).await,)*
                }
            }

            fn operation(&self) -> &dyn Operation {
                match self {
                    $(Self::$variant(op) => op,)*
                }
            }
        }

        $(
            impl From<$ty> for Command {
                fn from(op: $ty) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

commands! {
    InitBoard(InitBoard) => "init board",
    ExportBoard(ExportBoard) => "export board",
    ImportBoard(ImportBoard) => "import board",
    GetBoard(GetBoard) => "get board",

    AddTask(AddTask) => "add task",
    UpdateTask(UpdateTask) => "update task",
    MoveTask(MoveTask) => "move task",
    DeleteTask(DeleteTask) => "delete task",
    ArchiveTask(ArchiveTask) => "archive task",
    UnarchiveTask(UnarchiveTask) => "unarchive task",
    GetTask(GetTask) => "get task",
    ListArchived(ListArchived) => "list archived",

    AddSubtask(AddSubtask) => "add subtask",
    ToggleSubtask(ToggleSubtask) => "toggle subtask",
    DeleteSubtask(DeleteSubtask) => "delete subtask",

    AddColumn(AddColumn) => "add column",
    RenameColumn(RenameColumn) => "rename column",
    MoveColumn(MoveColumn) => "move column",
    DeleteColumn(DeleteColumn) => "delete column",

    AddSwimlane(AddSwimlane) => "add swimlane",
    RenameSwimlane(RenameSwimlane) => "rename swimlane",
    DeleteSwimlane(DeleteSwimlane) => "delete swimlane",

    AddDependency(AddDependency) => "add dependency",
    DeleteDependency(DeleteDependency) => "delete dependency",
    ListDependencies(ListDependencies) => "list dependencies",

    StartTimer(StartTimer) => "start timer",
    StopTimer(StopTimer) => "stop timer",
    ResetTimer(ResetTimer) => "reset timer",
    GetElapsed(GetElapsed) => "elapsed timer",

    AddComment(AddComment) => "add comment",
    ListComments(ListComments) => "list comments",

    AddAttachment(AddAttachment) => "add attachment",
    ListAttachments(ListAttachments) => "list attachments",

    SaveTemplate(SaveTemplate) => "save template",
    LoadTemplate(LoadTemplate) => "load template",
    ListTemplates(ListTemplates) => "list templates",
    DeleteTemplate(DeleteTemplate) => "delete template",

    AddRule(AddRule) => "add rule",
    RemoveRule(RemoveRule) => "remove rule",
}

impl Command {
    /// Canonical op string, e.g. "move task"
    pub fn op_string(&self) -> String {
        self.operation().op_string()
    }

    /// Whether running this command can change the board
    pub fn mutates(&self) -> bool {
        self.operation().mutates()
    }

    /// Parse one command object, or an array of them
    pub fn parse(input: Value) -> Result<Vec<Command>> {
        match input {
            Value::Array(items) => items.into_iter().map(Self::parse_one).collect(),
            Value::Object(_) => Ok(vec![Self::parse_one(input)?]),
            _ => Err(KanbanError::parse("input must be an object or array")),
        }
    }

    fn parse_one(input: Value) -> Result<Command> {
        if !input.is_object() {
            return Err(KanbanError::parse("command must be an object"));
        }
        serde_json::from_value(input).map_err(|e| KanbanError::parse(e.to_string()))
    }
}
