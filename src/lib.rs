use thiserror::Error;

pub type Result<T> = std::result::Result<T, FsError>;

pub mod commands;
pub mod completion;
pub mod dispatch;
pub mod history;
pub mod output;
pub mod path;
pub mod registry;
pub mod store;
pub mod tree;

pub use completion::Completion;
pub use dispatch::{Session, SharedShell, Shell, tokenize};
pub use history::HistoryLog;
pub use output::Output;
pub use registry::{CommandContext, CommandEntry, CommandRegistry, Handler};
pub use store::{JsonStore, Persister, Store, SurrealStore};
pub use tree::{FileSystem, Node, NodeKind};

#[derive(Debug, Error)]
pub enum FsError {
    #[error("The system cannot find the path specified: {0}")]
    NotFound(String),
    #[error("A subdirectory or file {0} already exists.")]
    AlreadyExists(String),
    #[error("Access is denied: {0} is a directory")]
    NotAFile(String),
    #[error("The directory name is invalid: {0}")]
    NotADirectory(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("The syntax of the command is incorrect. Usage: {0}")]
    MissingArgument(&'static str),
    #[error("Error executing command: {0}")]
    Command(String),
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Surreal(#[from] surrealdb::Error),
}
