//! Erasable output surface used for in-place redraws.
//!
//! The pager only needs two primitives: write a block of lines, and erase the
//! last `n` lines. [`TerminalSurface`] implements them with crossterm cursor
//! movement; [`RecordingSurface`] records them so tests can check exactly
//! what would have been drawn and erased.

use anyhow::Result;
use crossterm::{
    cursor::MoveUp,
    queue,
    terminal::{self, Clear, ClearType},
};
use std::io::{self, Write};

/// Fallback when the output is not attached to a terminal.
pub const DEFAULT_TERMINAL_SIZE: TerminalSize = TerminalSize {
    columns: 80,
    rows: 24,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub columns: u16,
    pub rows: u16,
}

pub fn terminal_size() -> TerminalSize {
    match terminal::size() {
        Ok((columns, rows)) => TerminalSize { columns, rows },
        Err(e) => {
            tracing::debug!("Terminal size unavailable ({e}), assuming 80x24");
            DEFAULT_TERMINAL_SIZE
        }
    }
}

pub trait Surface: Write {
    /// Writes `block` and terminates it with a newline if it lacks one.
    fn write_block(&mut self, block: &str) -> Result<()> {
        self.write_all(block.as_bytes())?;
        if !block.ends_with('\n') {
            self.write_all(b"\n")?;
        }
        self.flush()?;
        Ok(())
    }

    /// Moves the cursor up one line and clears it, `count` times.
    fn erase_lines(&mut self, count: usize) -> Result<()>;
}

pub struct TerminalSurface<W: Write> {
    writer: W,
}

impl TerminalSurface<io::Stdout> {
    pub fn new() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl Default for TerminalSurface<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Write for TerminalSurface<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn erase_lines(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            queue!(self.writer, MoveUp(1), Clear(ClearType::CurrentLine))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Print(String),
    Block(String),
    Erase(usize),
}

/// Keeps every operation for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Everything written, erasures ignored.
    pub fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Print(s) | SurfaceOp::Block(s) => Some(s.as_str()),
                SurfaceOp::Erase(_) => None,
            })
            .collect()
    }

    pub fn blocks(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Block(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Write for RecordingSurface {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf).into_owned();
        match self.ops.last_mut() {
            Some(SurfaceOp::Print(s)) => s.push_str(&text),
            _ => self.ops.push(SurfaceOp::Print(text)),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Surface for RecordingSurface {
    fn write_block(&mut self, block: &str) -> Result<()> {
        let mut block = block.to_string();
        if !block.ends_with('\n') {
            block.push('\n');
        }
        self.ops.push(SurfaceOp::Block(block));
        Ok(())
    }

    fn erase_lines(&mut self, count: usize) -> Result<()> {
        self.ops.push(SurfaceOp::Erase(count));
        Ok(())
    }
}
