//! Ordered append-only accumulator for captured output lines.

/// Collects text lines in insertion order when the final count is unknown.
///
/// Backed by a `Vec`, so appends are amortized O(1). Build it up with
/// [`append`](LineBuffer::append), then take the final sequence with
/// [`into_lines`](LineBuffer::into_lines).
#[derive(Debug, Default)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Append one line at the end.
    pub fn append(&mut self, line: String) {
        self.lines.push(line);
    }

    /// Number of lines appended so far.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines have been appended.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consume the buffer, yielding the lines in insertion order.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
