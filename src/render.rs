//! Text layout for ticket tables and single-ticket details.

use crate::normalize::{integer_field, text_field, TicketRow, COLUMNS, ID_COLUMN};
use crate::walker::RawTicket;

use comfy_table::{presets::ASCII_FULL_CONDENSED, Table};
use std::io::Write;

/// Lines a rendered table occupies besides its rows: top border, header,
/// header separator, bottom border.
pub const TABLE_FRAME_LINES: usize = 4;

/// Upper bound on the single-ticket divider width.
pub const MAX_DIVIDER_WIDTH: usize = 50;

/// Renders `rows` as a bordered table, one terminal line per row.
pub fn render_table(rows: &[TicketRow]) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL_CONDENSED);

    let mut header = vec![ID_COLUMN];
    header.extend(COLUMNS);
    table.set_header(header);

    for row in rows {
        let mut cells = vec![row.id.to_string()];
        cells.extend(row.cells().iter().map(|cell| single_line(cell)));
        table.add_row(cells);
    }

    table.to_string()
}

/// Number of terminal lines [`render_table`] produces for `row_count` rows.
pub fn table_height(row_count: usize) -> usize {
    row_count + TABLE_FRAME_LINES
}

// Embedded newlines would make a row span several lines and break the
// erase arithmetic of the pager.
fn single_line(text: &str) -> String {
    if text.contains(['\n', '\r']) {
        text.split(['\n', '\r'])
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        text.to_string()
    }
}

pub fn format_single(ticket: &RawTicket, columns: u16) -> String {
    let divider = "-".repeat(usize::from(columns).min(MAX_DIVIDER_WIDTH));
    let field = |key: &str| text_field(ticket, key);
    let number = |key: &str| integer_field(ticket, key);

    format!(
        "{divider}\n\
         Ticket ID: {}\tSubject: {}\n\
         Priority: {}\tStatus: {}\n\
         \n\
         {}\n\
         \n\
         Organization: {}\tSubmitted by: {}\tAssigned to: {}\n\
         {divider}\n",
        number("id"),
        field("subject"),
        field("priority"),
        field("status"),
        field("description"),
        number("organization_id"),
        number("submitter_id"),
        number("assignee_id"),
    )
}

pub fn write_single(ticket: &RawTicket, columns: u16, out: &mut dyn Write) -> anyhow::Result<()> {
    out.write_all(format_single(ticket, columns).as_bytes())?;
    out.flush()?;
    Ok(())
}
