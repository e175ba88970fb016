use crate::profile::format::banner;
use std::io::{self, Write};

/// Line oriented destination for progress lines and the recap.
pub trait Sink {
    fn display(&mut self, line: &str) -> io::Result<()>;

    /// Blank line followed by a `*` filled header.
    fn banner(&mut self, msg: &str) -> io::Result<()> {
        self.display("")?;
        self.display(&banner(msg))
    }
}

/// Writes each line to the wrapped writer, flushing after every line so
/// progress shows up while tasks are still running.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn display(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn display(&mut self, line: &str) -> io::Result<()> {
        (**self).display(line)
    }
}

impl Sink for Vec<String> {
    fn display(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}
