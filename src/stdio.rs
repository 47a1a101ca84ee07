use anyhow::Result;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Interactive line input.
pub trait LineSource {
    /// Next line without its terminator, `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>>;
}

impl<T: LineSource + ?Sized> LineSource for &mut T {
    fn read_line(&mut self) -> Result<Option<String>> {
        (**self).read_line()
    }
}

pub struct StdinLines {
    stdin: io::Stdin,
}

impl StdinLines {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdinLines {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for StdinLines {
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buffer = String::new();
        if self.stdin.lock().read_line(&mut buffer)? == 0 {
            return Ok(None);
        }
        strip_terminator(&mut buffer);
        Ok(Some(buffer))
    }
}

fn strip_terminator(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

/// Replays a fixed list of lines, then reports end of input.
#[derive(Debug, Default, Clone)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Prompts until a non-empty answer is given. `None` at end of input.
pub fn ask_string(
    input: &mut dyn LineSource,
    out: &mut dyn Write,
    msg: &str,
) -> Result<Option<String>> {
    loop {
        if !msg.is_empty() {
            write!(out, "{msg}")?;
            out.flush()?;
        }

        match input.read_line()? {
            None => return Ok(None),
            Some(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    return Ok(Some(line.to_string()));
                }
            }
        }
    }
}

pub fn ask_binary(input: &mut dyn LineSource, out: &mut dyn Write, msg: &str) -> Result<bool> {
    let answer = ask_string(input, out, msg)?.unwrap_or_default();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_lines_run_out() {
        let mut lines = ScriptedLines::new(["a", "b"]);
        assert_eq!(lines.read_line().unwrap().as_deref(), Some("a"));
        assert_eq!(lines.remaining(), 1);
        assert_eq!(lines.read_line().unwrap().as_deref(), Some("b"));
        assert_eq!(lines.read_line().unwrap(), None);
    }

    #[test]
    fn ask_string_skips_blank_answers() {
        let mut input = ScriptedLines::new(["", "  ", " acme "]);
        let mut out = Vec::new();
        let answer = ask_string(&mut input, &mut out, "subdomain: ").unwrap();
        assert_eq!(answer.as_deref(), Some("acme"));
        assert_eq!(String::from_utf8(out).unwrap(), "subdomain: ".repeat(3));
    }

    #[test]
    fn ask_string_returns_none_at_end_of_input() {
        let mut input = ScriptedLines::default();
        assert_eq!(ask_string(&mut input, &mut Vec::new(), "").unwrap(), None);
    }

    #[test]
    fn ask_binary_accepts_y_and_yes() {
        for (answer, expected) in [("y", true), ("YES", true), ("n", false), ("maybe", false)] {
            let mut input = ScriptedLines::new([answer]);
            assert_eq!(ask_binary(&mut input, &mut Vec::new(), "? ").unwrap(), expected);
        }
        assert!(!ask_binary(&mut ScriptedLines::default(), &mut Vec::new(), "? ").unwrap());
    }

    #[test]
    fn terminators_are_stripped() {
        let mut line = "select 1\r\n".to_string();
        strip_terminator(&mut line);
        assert_eq!(line, "select 1");
    }
}
