use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Bounded ring of formatted log lines shown in the TUI logs pane.
pub struct LogStore {
    lines: VecDeque<String>,
    max_lines: usize,
    pushed: u64,
}

impl LogStore {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
            pushed: 0,
        }
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.is_empty() {
            return;
        }
        self.lines.push_back(line);
        self.pushed += 1;
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines ever accepted, including ones already evicted.
    pub fn total_pushed(&self) -> u64 {
        self.pushed
    }

    /// Up to `max` lines ending `skip_from_end` lines before the newest.
    pub fn tail(&self, skip_from_end: usize, max: usize) -> Vec<String> {
        let end = self.lines.len().saturating_sub(skip_from_end);
        let start = end.saturating_sub(max);
        self.lines.range(start..end).cloned().collect()
    }
}

pub type SharedLogStore = Arc<Mutex<LogStore>>;

#[derive(Clone)]
pub struct LogMakeWriter {
    store: SharedLogStore,
}

impl LogMakeWriter {
    pub fn new(store: SharedLogStore) -> Self {
        Self { store }
    }
}

impl<'a> MakeWriter<'a> for LogMakeWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            store: self.store.clone(),
            partial: String::new(),
        }
    }
}

pub struct LogWriter {
    store: SharedLogStore,
    partial: String,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(idx) = self.partial.find('\n') {
            let line = self.partial[..idx].trim_end_matches('\r').to_string();
            self.partial.drain(..=idx);
            self.store.lock().push_line(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let line = self.partial.trim();
        if !line.is_empty() {
            self.store.lock().push_line(line.to_string());
        }
    }
}
