//! Command registry: lowercase name to handler plus description.
//!
//! Built-ins are installed through the same `register` call external code
//! uses, so a host can add or override commands before the first line is run.

use std::collections::BTreeMap;

use crate::dispatch::Session;
use crate::{Output, Result};

pub type Handler = Box<dyn Fn(&mut CommandContext<'_>) -> Result<Output> + Send + Sync>;

/// Everything a handler gets to see for one invocation.
pub struct CommandContext<'a> {
    /// Arguments after the command name, quotes already stripped.
    pub args: &'a [String],
    pub session: &'a mut Session,
    pub registry: &'a CommandRegistry,
}

impl CommandContext<'_> {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Resolve an argument against the session's current directory.
    pub fn path_arg(&self, index: usize) -> Option<String> {
        self.arg(index)
            .map(|target| crate::path::normalize(&self.session.cwd, target))
    }
}

pub struct CommandEntry {
    pub name: String,
    pub description: String,
    pub handler: Handler,
}

#[derive(Default)]
pub struct CommandRegistry {
    entries: BTreeMap<String, CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store under the lowercased name. Re-registering a name replaces it.
    pub fn register<F>(&mut self, name: &str, description: impl Into<String>, handler: F)
    where
        F: Fn(&mut CommandContext<'_>) -> Result<Output> + Send + Sync + 'static,
    {
        let key = name.to_lowercase();
        self.entries.insert(
            key.clone(),
            CommandEntry {
                name: key,
                description: description.into(),
                handler: Box::new(handler),
            },
        );
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.get(&name.to_lowercase())
    }

    /// Registered names, alphabetically.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
