//! Tab completion over command names and directory entries.
//!
//! Completion reads the same tree and resolver that commands use and never
//! executes anything.

use crate::dispatch::{Session, Token, ends_in_quote, tokenize_spans};
use crate::path;
use crate::registry::CommandRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Nothing matched; leave the input alone.
    NoMatch,
    /// Exactly one match; this is the new input line.
    Replace(String),
    /// Several matches to show the user; the input is unchanged.
    Candidates(Vec<String>),
}

/// Complete the last token of `input`.
///
/// With a single token the candidates are command names; otherwise they are
/// entries of the current directory, or of the directory named before the
/// last `/` in the token. Prefix matching is case-sensitive.
pub fn complete(input: &str, session: &Session, registry: &CommandRegistry) -> Completion {
    let mut tokens = tokenize_spans(input);
    let Some(end) = tokens.last().map(|t| t.end) else {
        return Completion::NoMatch;
    };

    // An opening quote with nothing typed after it starts an empty token.
    let tail = &input[end..];
    if let Some(offset) = tail.find('"') {
        tokens.push(Token {
            start: end + offset,
            end: input.len(),
            text: String::new(),
        });
    } else if input.ends_with(char::is_whitespace) && !ends_in_quote(input) {
        tokens.push(Token {
            start: input.len(),
            end: input.len(),
            text: String::new(),
        });
    }

    let Some(last) = tokens.last() else {
        return Completion::NoMatch;
    };
    let candidates = if tokens.len() == 1 {
        command_candidates(&last.text, registry)
    } else {
        entry_candidates(&last.text, session)
    };

    if candidates.len() > 1 {
        return Completion::Candidates(candidates);
    }
    let Some(only) = candidates.first() else {
        return Completion::NoMatch;
    };
    let quoted = input[last.start..].starts_with('"');
    Completion::Replace(format!("{}{} ", &input[..last.start], quote(only, quoted)))
}

fn command_candidates(prefix: &str, registry: &CommandRegistry) -> Vec<String> {
    registry
        .names()
        .filter(|name| name.starts_with(prefix))
        .map(str::to_string)
        .collect()
}

fn entry_candidates(partial: &str, session: &Session) -> Vec<String> {
    let (dir_part, prefix) = match partial.rsplit_once('/') {
        Some((dir, leaf)) => (Some(dir), leaf),
        None => (None, partial),
    };
    let dir_path = match dir_part {
        Some("") => path::ROOT.to_string(),
        Some(dir) => path::normalize(&session.cwd, dir),
        None => session.cwd.clone(),
    };

    let Some(listing) = session.fs.resolve(&dir_path).and_then(|n| n.list().ok()) else {
        return Vec::new();
    };

    listing
        .into_iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, _)| match dir_part {
            Some(dir) => format!("{dir}/{name}"),
            None => name,
        })
        .collect()
}

/// Wrap `text` in quotes when it needs them or the user already opened one.
fn quote(text: &str, opened: bool) -> String {
    if opened || text.contains(char::is_whitespace) {
        format!("\"{text}\"")
    } else {
        text.to_string()
    }
}
