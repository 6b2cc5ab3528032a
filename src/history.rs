/// Submitted input lines, oldest first, with an Up/Down recall cursor.
///
/// Recall only moves the cursor; the log itself is append-only.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<String>,
    /// Index of the entry currently shown, `None` when not recalling.
    cursor: Option<usize>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submitted line and stop recalling.
    pub fn push(&mut self, raw: impl Into<String>) {
        self.entries.push(raw.into());
        self.cursor = None;
    }

    /// Step toward older entries. The first press lands on the newest entry;
    /// presses past the oldest keep returning it. `None` means the history is
    /// empty and the input should be left as is.
    pub fn up(&mut self) -> Option<&str> {
        let last = self.entries.len().checked_sub(1)?;
        let idx = match self.cursor {
            None => last,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(idx);
        Some(&self.entries[idx])
    }

    /// Step toward newer entries. Moving past the newest clears the cursor
    /// and returns an empty line.
    pub fn down(&mut self) -> &str {
        match self.cursor {
            Some(i) if i + 1 < self.entries.len() => {
                self.cursor = Some(i + 1);
                &self.entries[i + 1]
            }
            _ => {
                self.cursor = None;
                ""
            }
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
