//! Line-oriented output buffer with indentation.

/// Accumulates source lines at the current indentation level.
#[derive(Debug, Clone)]
pub struct CodeWriter {
    lines: Vec<String>,
    indent: usize,
    unit: String,
}

impl CodeWriter {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            indent: 0,
            unit: unit.into(),
        }
    }

    /// Write one or more lines at the current indentation.
    ///
    /// Embedded newlines start new lines at the same level; empty lines carry
    /// no indentation.
    pub fn line(&mut self, text: &str) {
        for part in text.split('\n') {
            if part.trim().is_empty() {
                self.lines.push(String::new());
            } else {
                let mut line = self.unit.repeat(self.indent);
                line.push_str(part.trim_end());
                self.lines.push(line);
            }
        }
    }

    /// Write text verbatim, ignoring indentation. One trailing newline
    /// ends the last line; anything else is kept as written.
    pub fn raw(&mut self, text: &str) {
        let text = text.strip_suffix('\n').unwrap_or(text);
        for part in text.split('\n') {
            self.lines.push(part.to_string());
        }
    }

    /// A single separating blank line; never leading, never doubled.
    pub fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Append to the last written line.
    pub fn append(&mut self, text: &str) {
        if let Some(last) = self.lines.last_mut() {
            last.push_str(text);
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Final text: trailing blank lines dropped, exactly one final newline.
    pub fn finish(mut self) -> String {
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
