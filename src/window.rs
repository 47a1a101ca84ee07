use crate::stdio::LineSource;

use anyhow::Result;
use std::io::Write;

/// Below this many rows a full page of tickets does not fit on screen.
pub const MIN_TERMINAL_ROWS: u16 = 31;

pub const WINDOW_TOO_SHORT: &str = "Current terminal window size is too short. It is recommended to increase the height for the best viewing experience. Type 'Y' to continue.";

/// Blocks while the terminal is shorter than [`MIN_TERMINAL_ROWS`] until the
/// user confirms with `Y`. The height is queried again before every prompt so
/// resizing the window also releases the check.
pub fn check_window<F, W>(mut rows: F, input: &mut dyn LineSource, out: &mut W) -> Result<()>
where
    F: FnMut() -> u16,
    W: Write + ?Sized,
{
    while rows() < MIN_TERMINAL_ROWS {
        writeln!(out, "{WINDOW_TOO_SHORT}")?;
        out.flush()?;

        match input.read_line()? {
            None => break,
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => break,
            Some(_) => {}
        }
    }
    Ok(())
}
