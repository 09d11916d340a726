//! Board commands

mod export;
mod get;
mod import;
mod init;

pub use export::ExportBoard;
pub use get::GetBoard;
pub use import::ImportBoard;
pub use init::InitBoard;
