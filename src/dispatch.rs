use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use crate::commands;
use crate::completion::{self, Completion};
use crate::history::HistoryLog;
use crate::path::ROOT;
use crate::registry::{CommandContext, CommandRegistry};
use crate::store::Persister;
use crate::{FileSystem, Output, Result};

pub const DEFAULT_USER: &str = "guest";

/// A `Shell` shared between concurrent callers. Hold the lock for one
/// `execute` so no caller sees a half-applied command.
pub type SharedShell = Arc<tokio::sync::Mutex<Shell>>;

/// The state every handler works against.
#[derive(Debug, Clone)]
pub struct Session {
    pub cwd: String,
    pub fs: FileSystem,
}

impl Session {
    pub fn new(fs: FileSystem) -> Self {
        Self {
            cwd: ROOT.to_string(),
            fs,
        }
    }
}

/// A token with the byte range it covers in the raw line, quotes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Split on whitespace, treating `"` as a toggle that keeps spaces inside the
/// current token. Quotes are dropped from the output and an unterminated
/// quote runs to the end of the line.
pub fn tokenize(raw: &str) -> Vec<String> {
    tokenize_spans(raw).into_iter().map(|t| t.text).collect()
}

pub(crate) fn tokenize_spans(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut in_quote = false;

    for (idx, ch) in raw.char_indices() {
        if ch.is_whitespace() && !in_quote {
            if let Some(begin) = start.take() {
                if !current.is_empty() {
                    tokens.push(Token {
                        start: begin,
                        end,
                        text: std::mem::take(&mut current),
                    });
                }
            }
            continue;
        }

        if ch == '"' {
            in_quote = !in_quote;
        } else {
            current.push(ch);
        }
        start.get_or_insert(idx);
        end = idx + ch.len_utf8();
    }

    if let Some(begin) = start {
        if !current.is_empty() {
            tokens.push(Token {
                start: begin,
                end,
                text: current,
            });
        }
    }

    tokens
}

/// `true` when the line ends inside an unterminated quote.
pub(crate) fn ends_in_quote(raw: &str) -> bool {
    raw.chars().filter(|&c| c == '"').count() % 2 == 1
}

/// One interactive session: the tree and current directory, the command
/// table, recall history, and an optional background persister.
pub struct Shell {
    session: Session,
    registry: CommandRegistry,
    history: HistoryLog,
    user: String,
    persister: Option<Persister>,
}

impl Shell {
    /// A shell over `fs` with every built-in installed.
    pub fn new(fs: FileSystem) -> Self {
        let mut registry = CommandRegistry::new();
        commands::register_builtins(&mut registry);
        Self {
            session: Session::new(fs),
            registry,
            history: HistoryLog::new(),
            user: DEFAULT_USER.to_string(),
            persister: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_persister(mut self, persister: Persister) -> Self {
        self.persister = Some(persister);
        self
    }

    /// Add or replace a command. Call before the first `execute`.
    pub fn register<F>(&mut self, name: &str, description: impl Into<String>, handler: F)
    where
        F: Fn(&mut CommandContext<'_>) -> Result<Output> + Send + Sync + 'static,
    {
        self.registry.register(name, description, handler);
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cwd(&self) -> &str {
        &self.session.cwd
    }

    pub fn fs(&self) -> &FileSystem {
        &self.session.fs
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn prompt(&self) -> String {
        format!("{}@DOS:{}>", self.user, self.session.cwd)
    }

    /// Run one input line. Never fails: domain errors and handler faults both
    /// come back as output lines.
    pub fn execute(&mut self, raw: &str) -> Output {
        if raw.trim().is_empty() {
            return Output::new();
        }

        let mut out = Output::line(format!("{} {}", self.prompt(), raw));
        self.history.push(raw);

        let tokens = tokenize(raw);
        let Some((first, args)) = tokens.split_first() else {
            return out;
        };
        let name = first.to_lowercase();

        let Some(entry) = self.registry.lookup(&name) else {
            debug!(command = %name, "unknown command");
            out.push(format!(
                "'{name}' is not recognized as an internal or external command"
            ));
            return out;
        };

        debug!(command = %name, ?args, cwd = %self.session.cwd, "dispatching");
        let generation = self.session.fs.generation();
        let mut ctx = CommandContext {
            args,
            session: &mut self.session,
            registry: &self.registry,
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (entry.handler)(&mut ctx)));

        if self.session.fs.generation() != generation {
            self.persist();
        }

        match outcome {
            Ok(Ok(result)) if result.clear => return result,
            Ok(Ok(result)) => out.extend(result),
            Ok(Err(e)) => out.push(e.to_string()),
            Err(payload) => out.push(format!(
                "Error executing command: {}",
                panic_message(payload.as_ref())
            )),
        }
        out
    }

    /// Recall an older line. `None` leaves the input as it is.
    pub fn history_up(&mut self) -> Option<String> {
        self.history.up().map(str::to_string)
    }

    /// Recall a newer line, or an empty one past the newest.
    pub fn history_down(&mut self) -> String {
        self.history.down().to_string()
    }

    pub fn complete(&self, input: &str) -> Completion {
        completion::complete(input, &self.session, &self.registry)
    }

    fn persist(&self) {
        if let Some(persister) = &self.persister {
            persister.submit(self.session.fs.snapshot());
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown failure".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsError;

    fn shell() -> Shell {
        Shell::new(FileSystem::seed())
    }

    fn run(shell: &mut Shell, line: &str) -> Vec<String> {
        shell.execute(line).lines
    }

    #[test]
    fn tokenize_keeps_quoted_spaces() {
        assert_eq!(tokenize(r#"echo "a b" c"#), vec!["echo", "a b", "c"]);
        assert_eq!(tokenize("  dir   /GAMES  "), vec!["dir", "/GAMES"]);
        assert_eq!(tokenize(r#"type "MY FILE"#), vec!["type", "MY FILE"]);
        assert_eq!(tokenize(r#"x"y z"w"#), vec!["xy zw"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn token_spans_point_at_raw_offsets() {
        let spans = tokenize_spans(r#"cd "My Dir" x"#);
        assert_eq!(spans[0].end, 2);
        assert_eq!(spans[1].start, 3);
        assert_eq!(spans[1].end, 11);
        assert_eq!(spans[1].text, "My Dir");
        assert_eq!(spans[2].start, 12);
        assert_eq!(spans[2].end, 13);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut sh = shell();
        assert!(sh.execute("").is_empty());
        assert!(sh.execute("   \t ").is_empty());
        assert!(sh.history().is_empty());
    }

    #[test]
    fn execute_echoes_prompt_and_records_history() {
        let mut sh = shell().with_user("ada");
        let lines = run(&mut sh, "echo  hi   there");
        assert_eq!(lines, vec!["ada@DOS:/> echo  hi   there", "hi there"]);
        assert_eq!(sh.history().entries(), ["echo  hi   there"]);
    }

    #[test]
    fn unknown_command_is_reported() {
        let mut sh = shell();
        let lines = run(&mut sh, "FORMAT c:");
        assert_eq!(
            lines[1],
            "'format' is not recognized as an internal or external command"
        );
        assert_eq!(sh.history().len(), 1);
    }

    #[test]
    fn command_names_ignore_case() {
        let mut sh = shell();
        let lines = run(&mut sh, "PWD");
        assert_eq!(lines[1], "/");
    }

    #[test]
    fn handler_panic_is_contained() {
        let mut sh = shell();
        sh.register("boom", "always fails", |_| panic!("kaboom"));
        let lines = run(&mut sh, "boom");
        assert_eq!(lines[1], "Error executing command: kaboom");
        let lines = run(&mut sh, "pwd");
        assert_eq!(lines[1], "/");
    }

    #[test]
    fn handler_fault_error_is_rendered() {
        let mut sh = shell();
        sh.register("fault", "reports a fault", |_| {
            Err(FsError::Command("disk on fire".into()))
        });
        let lines = run(&mut sh, "fault");
        assert_eq!(lines[1], "Error executing command: disk on fire");
    }

    #[test]
    fn custom_command_sees_session() {
        let mut sh = shell();
        sh.register("Here", "print cwd and args", |ctx| {
            Ok(Output::line(format!(
                "{} {}",
                ctx.session.cwd,
                ctx.args.join(",")
            )))
        });
        run(&mut sh, "cd GAMES");
        let lines = run(&mut sh, r#"here "a b" c"#);
        assert_eq!(lines[1], "/GAMES a b,c");
    }

    #[test]
    fn cls_clears_everything() {
        let mut sh = shell();
        let out = sh.execute("cls");
        assert!(out.clear);
        assert!(out.lines.is_empty());
        assert_eq!(sh.history().len(), 1);
    }

    #[test]
    fn end_to_end_seed_walkthrough() {
        let mut sh = shell();
        let before = sh.fs().snapshot();

        let lines = run(&mut sh, "mkdir GAMES");
        assert_eq!(lines[1], "A subdirectory or file GAMES already exists.");
        assert_eq!(sh.fs().snapshot(), before);

        run(&mut sh, "cd GAMES");
        assert_eq!(sh.cwd(), "/GAMES");
        assert_eq!(sh.prompt(), "guest@DOS:/GAMES>");

        run(&mut sh, "touch SAVE.DAT");
        let lines = run(&mut sh, "dir");
        assert_eq!(&lines[1..], ["README.TXT", "SAVE.DAT"]);

        run(&mut sh, "rm README.TXT");
        let lines = run(&mut sh, "type README.TXT");
        assert_eq!(
            lines[1],
            "The system cannot find the path specified: /GAMES/README.TXT"
        );
    }

    #[test]
    fn history_recall_through_shell() {
        let mut sh = shell();
        for line in ["dir", "cd GAMES", "pwd"] {
            sh.execute(line);
        }
        assert_eq!(sh.history_up().as_deref(), Some("pwd"));
        assert_eq!(sh.history_up().as_deref(), Some("cd GAMES"));
        assert_eq!(sh.history_up().as_deref(), Some("dir"));
        assert_eq!(sh.history_up().as_deref(), Some("dir"));
        assert_eq!(sh.history_down(), "cd GAMES");
        assert_eq!(sh.history().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shared_shell_serializes_commands() {
        let shared: SharedShell = Arc::new(tokio::sync::Mutex::new(shell()));

        let tasks: Vec<_> = ["LEFT", "RIGHT"]
            .into_iter()
            .map(|name| {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    shared.lock().await.execute(&format!("mkdir {name}"));
                    shared
                        .lock()
                        .await
                        .execute(&format!("touch {name}/README.TXT"));
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let sh = shared.lock().await;
        assert!(sh.fs().resolve("/LEFT/README.TXT").is_some());
        assert!(sh.fs().resolve("/RIGHT/README.TXT").is_some());
        assert_eq!(sh.history().len(), 4);
    }
}
