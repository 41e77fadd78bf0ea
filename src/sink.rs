//! Destinations for logged POST bodies.
//!
//! Every body is written as one block: the text, then a blank line, the `---`
//! separator and another blank line.

use std::io::{self, Write};
use std::sync::Mutex;

/// Trailer written after every body.
pub const SEPARATOR: &str = "\n---\n\n";

/// Receives the decoded text of each POST body.
pub trait BodySink: Send + Sync + 'static {
    /// Record one body. An error fails the request, not the server.
    fn record(&self, text: &str) -> io::Result<()>;
}

/// Writes body blocks to the process's standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl BodySink for StdoutSink {
    fn record(&self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.write_all(SEPARATOR.as_bytes())?;
        out.flush()
    }
}

/// Keeps body blocks in memory, exactly as [`StdoutSink`] would print them.
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded blocks, oldest first.
    pub fn blocks(&self) -> Vec<String> {
        self.blocks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Everything recorded so far, concatenated.
    pub fn contents(&self) -> String {
        self.blocks().concat()
    }
}

impl BodySink for MemorySink {
    fn record(&self, text: &str) -> io::Result<()> {
        let mut block = String::with_capacity(text.len() + SEPARATOR.len());
        block.push_str(text);
        block.push_str(SEPARATOR);
        self.blocks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(block);
        Ok(())
    }
}
