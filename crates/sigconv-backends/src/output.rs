//! Output sink abstraction: one line-terminated unit at a time, to a
//! file or standard output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Destination for generated queries and finalized artifacts.
///
/// Line-oriented backends write one line per rule; accumulating backends
/// write exactly once, from `finalize`. A write failure is fatal to the
/// run; nothing is retried.
pub trait OutputSink {
    /// Append one line-terminated unit to the destination.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Flush and release the underlying resource.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink writing UTF-8 text to a named file, or to standard output when no
/// file name is given.
pub struct LineSink {
    out: BufWriter<Box<dyn Write>>,
}

impl LineSink {
    /// Open `path` for writing, or fall back to standard output.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let out: Box<dyn Write> = match path {
            Some(p) => Box::new(File::create(p)?),
            None => Box::new(io::stdout()),
        };
        Ok(LineSink {
            out: BufWriter::new(out),
        })
    }

    pub fn stdout() -> Self {
        LineSink {
            out: BufWriter::new(Box::new(io::stdout())),
        }
    }
}

impl OutputSink for LineSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// All written lines joined back together.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl OutputSink for MemorySink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}
