//! Fixed-size page windows over a ticket table with in-place redraw.

use crate::normalize::TicketTable;
use crate::render::render_table;
use crate::stdio::LineSource;
use crate::terminal::Surface;

use anyhow::Result;
use std::io::Write;
use std::ops::Range;

pub const PAGE_SIZE: usize = 25;

pub const BANNER: &str = "Type '<' or '>' to navigate between pages, 'q' to end ticket viewing.";

pub const EMPTY_TABLE: &str = "No tickets to display.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Splits `total` rows into consecutive windows of `size`; the last one may
/// be shorter. A table without rows has no windows.
pub fn page_windows(total: usize, size: usize) -> Vec<PageWindow> {
    let size = size.max(1);
    (0..total)
        .step_by(size)
        .map(|start| PageWindow {
            start,
            end: (start + size).min(total),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    Quit,
    Other,
}

impl Navigation {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            ">" | "n" | "next" => Navigation::Next,
            "<" | "p" | "prev" | "previous" => Navigation::Previous,
            "q" | "quit" => Navigation::Quit,
            _ => Navigation::Other,
        }
    }
}

pub struct Pager<'a> {
    table: &'a TicketTable,
    windows: Vec<PageWindow>,
    current: usize,
}

impl<'a> Pager<'a> {
    pub fn new(table: &'a TicketTable) -> Self {
        Self::with_page_size(table, PAGE_SIZE)
    }

    pub fn with_page_size(table: &'a TicketTable, size: usize) -> Self {
        Pager {
            table,
            windows: page_windows(table.len(), size),
            current: 0,
        }
    }

    pub fn windows(&self) -> &[PageWindow] {
        &self.windows
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn window(&self) -> Option<PageWindow> {
        self.windows.get(self.current).copied()
    }

    /// Applies `nav` and reports whether the visible window changed.
    /// Moving past either end leaves the state untouched.
    pub fn navigate(&mut self, nav: Navigation) -> bool {
        match nav {
            Navigation::Next if self.current + 1 < self.windows.len() => {
                self.current += 1;
                true
            }
            Navigation::Previous if self.current > 0 => {
                self.current -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn render_current(&self) -> String {
        match self.window() {
            Some(window) => render_table(&self.table.rows()[window.range()]),
            None => String::new(),
        }
    }
}

/// Shows `table` one window at a time until the user quits or input ends.
/// Every redraw first erases exactly the lines of the block it replaces.
pub fn run_pager(
    table: &TicketTable,
    input: &mut dyn LineSource,
    surface: &mut dyn Surface,
) -> Result<()> {
    let mut pager = Pager::new(table);
    if pager.windows().is_empty() {
        writeln!(surface, "{EMPTY_TABLE}")?;
        surface.flush()?;
        return Ok(());
    }

    surface.write_block(&format!("{BANNER}\n\n"))?;
    let mut drawn = pager.render_current();
    surface.write_block(&drawn)?;

    loop {
        let Some(line) = input.read_line()? else {
            break;
        };
        // The typed command echoes on its own line.
        surface.erase_lines(1)?;

        let nav = Navigation::parse(&line);
        if nav == Navigation::Quit {
            break;
        }
        if pager.navigate(nav) {
            tracing::debug!(
                "Page {} of {}",
                pager.current() + 1,
                pager.windows().len()
            );
            surface.erase_lines(drawn.lines().count())?;
            drawn = pager.render_current();
            surface.write_block(&drawn)?;
        }
    }
    Ok(())
}
