/// Lines produced by one command, in order.
///
/// `clear` asks the display to drop everything shown so far before appending
/// `lines`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub lines: Vec<String>,
    pub clear: bool,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            clear: false,
        }
    }

    pub fn cleared() -> Self {
        Self {
            lines: Vec::new(),
            clear: true,
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// Content may span several lines; each becomes its own output line.
    pub fn push_text(&mut self, text: &str) {
        self.lines.extend(text.split('\n').map(str::to_string));
    }

    pub fn extend(&mut self, other: Output) {
        if other.clear {
            self.lines.clear();
            self.clear = true;
        }
        self.lines.extend(other.lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && !self.clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_text_keeps_blank_lines() {
        let mut out = Output::new();
        out.push_text("");
        assert_eq!(out.lines, vec![""]);

        let mut out = Output::new();
        out.push_text("a\nb\n");
        assert_eq!(out.lines, vec!["a", "b", ""]);

        let mut out = Output::new();
        out.push_text("a\r\n\nb");
        assert_eq!(out.lines, vec!["a\r", "", "b"]);
    }

    #[test]
    fn extend_with_clear_drops_earlier_lines() {
        let mut out = Output::line("echo");
        out.extend(Output::cleared());
        assert!(out.clear);
        assert!(out.lines.is_empty());
        assert!(!out.is_empty());
    }
}
