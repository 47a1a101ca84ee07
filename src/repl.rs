use crate::fetch::{Fetcher, Sleeper};
use crate::http::HttpTransport;
use crate::normalize::normalize;
use crate::stdio::LineSource;
use crate::terminal::{terminal_size, Surface, TerminalSize};
use crate::url::TicketApi;
use crate::viewer::{describe_error, fetch_all, fetch_one, render_paged, render_single};

use anyhow::Result;
use std::io::Write;
use thiserror::Error;

pub const PROMPT: &str = "-> ";

const SELECT_KEYWORD: &str = "select";

pub const UNKNOWN_COMMAND: &str =
    "User command not recognised, please try again or type 'menu' to see list of commands.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Select command understood but ticket_id value is invalid. Please try again.")]
    InvalidTicketId { input: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Menu,
    All,
    Select(u64),
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim().to_lowercase();
        let command = match line.as_str() {
            "" => Command::Empty,
            "menu" => Command::Menu,
            "all" => Command::All,
            "quit" => Command::Quit,
            s if s == SELECT_KEYWORD || s.starts_with("select ") => {
                Command::Select(parse_select(s)?)
            }
            _ => Command::Unknown(line.clone()),
        };
        Ok(command)
    }
}

/// Extracts the ticket id of a `select <id>` command. Spaces anywhere are
/// ignored, so `select 3 4` selects ticket 34.
pub fn parse_select(input: &str) -> Result<u64, CommandError> {
    let invalid = || CommandError::InvalidTicketId {
        input: input.to_string(),
    };

    let compact: String = input
        .chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_lowercase();
    let id = compact.strip_prefix(SELECT_KEYWORD).ok_or_else(invalid)?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match id.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid()),
    }
}

pub struct Repl<T, S, I, O>
where
    T: HttpTransport,
    S: Sleeper,
    I: LineSource,
    O: Surface,
{
    fetcher: Fetcher<T, S>,
    api: TicketApi,
    input: I,
    surface: O,
    size: fn() -> TerminalSize,
}

impl<T, S, I, O> Repl<T, S, I, O>
where
    T: HttpTransport,
    S: Sleeper,
    I: LineSource,
    O: Surface,
{
    pub fn new(fetcher: Fetcher<T, S>, api: TicketApi, input: I, surface: O) -> Self {
        Self {
            fetcher,
            api,
            input,
            surface,
            size: terminal_size,
        }
    }

    pub fn with_terminal_size(mut self, size: fn() -> TerminalSize) -> Self {
        self.size = size;
        self
    }

    pub fn surface(&self) -> &O {
        &self.surface
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn fetcher(&self) -> &Fetcher<T, S> {
        &self.fetcher
    }

    pub fn print_welcome(&mut self, account: &str, email: &str) -> Result<()> {
        writeln!(
            self.surface,
            "Welcome to Zendesk Ticket Viewer. You are currently connected to {account} as {email}."
        )?;
        writeln!(
            self.surface,
            "Type 'menu' to view ticket options or 'quit' to exit the viewer.\n"
        )?;
        Ok(())
    }

    /// Reads commands until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        loop {
            write!(self.surface, "{PROMPT}")?;
            self.surface.flush()?;

            let Some(line) = self.input.read_line()? else {
                writeln!(self.surface)?;
                break;
            };
            if !self.execute_line(&line)? {
                break;
            }
        }
        Ok(())
    }

    /// Runs one command line. Returns `false` once the user asked to quit.
    pub fn execute_line(&mut self, line: &str) -> Result<bool> {
        match Command::parse(line) {
            Ok(command) => self.execute(command),
            Err(e) => {
                tracing::debug!("Rejected command {line:?}: {e:?}");
                writeln!(self.surface, "{e}")?;
                Ok(true)
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Menu => self.print_menu()?,
            Command::All => self.show_all()?,
            Command::Select(id) => self.show_one(id)?,
            Command::Quit => return Ok(false),
            Command::Empty => {}
            Command::Unknown(_) => writeln!(self.surface, "{UNKNOWN_COMMAND}")?,
        }
        Ok(true)
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.surface, "Available user commands:")?;
        writeln!(self.surface, "\tmenu:\t\tShow this list of commands")?;
        writeln!(self.surface, "\tquit:\t\tExit the ticket viewer")?;
        writeln!(
            self.surface,
            "\tall:\t\tView all tickets associated with subdomain and email"
        )?;
        writeln!(
            self.surface,
            "\tselect x:\tView ticket details of ticket with ticket_id = x"
        )?;
        Ok(())
    }

    fn show_all(&mut self) -> Result<()> {
        let tickets = match fetch_all(&self.fetcher, &self.api, &mut self.surface) {
            Ok(tickets) => tickets,
            Err(e) => {
                writeln!(self.surface, "{}", describe_error(&e))?;
                return Ok(());
            }
        };
        let table = match normalize(&tickets) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("{e}");
                writeln!(self.surface, "Tickets could not be displayed: {e}")?;
                return Ok(());
            }
        };

        let size = self.size;
        render_paged(&table, &mut self.input, &mut self.surface, || size().rows)
    }

    fn show_one(&mut self, id: u64) -> Result<()> {
        match fetch_one(&self.fetcher, &self.api, id) {
            Ok(ticket) => render_single(&ticket, (self.size)().columns, &mut self.surface),
            Err(e) => {
                writeln!(self.surface, "{}", describe_error(&e))?;
                Ok(())
            }
        }
    }
}
