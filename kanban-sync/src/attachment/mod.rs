//! Attachment commands. Attachments are append-only file references.

mod add;
mod list;

pub use add::AddAttachment;
pub use list::ListAttachments;
