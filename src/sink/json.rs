use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::SinkError;
use crate::event::Event;

use super::Sink;

/// Writes each event as one JSON document per line.
///
/// Document fields: `timestamp`, `level`, `context`, `caller` (when retained)
/// and `payload`.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonLinesSink<BufWriter<File>> {
    /// Appends to the file at `path`, creating it if needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<P, W> Sink<P> for JsonLinesSink<W>
where
    P: Serialize,
    W: Write + Send,
{
    fn write(&self, event: Event<P>) -> Result<(), SinkError> {
        // Serialize before locking so a bad payload never leaves a partial line.
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        self.writer.lock().write_all(&line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().flush()?;
        Ok(())
    }
}
