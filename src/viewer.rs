//! Entry points used by the command dispatcher.

use crate::fetch::{FetchError, Fetcher, Sleeper};
use crate::http::HttpTransport;
use crate::normalize::TicketTable;
use crate::pager::run_pager;
use crate::render::write_single;
use crate::stdio::LineSource;
use crate::terminal::Surface;
use crate::url::TicketApi;
use crate::walker::{fetch_single, walk_collection, RawTicket};
use crate::window::check_window;

use std::io::Write;

pub const NOT_FOUND_MESSAGE: &str =
    "API endpoint unavailable, possibly due to invalid ticket_id. Please try again.";

/// Every ticket of the account, in API order.
pub fn fetch_all<T, S>(
    fetcher: &Fetcher<T, S>,
    api: &TicketApi,
    progress: &mut dyn Write,
) -> Result<Vec<RawTicket>, FetchError>
where
    T: HttpTransport,
    S: Sleeper,
{
    let tickets = walk_collection(fetcher, &api.tickets_url(), progress)?;
    tracing::info!("Downloaded {} tickets from {api}", tickets.len());
    Ok(tickets)
}

pub fn fetch_one<T, S>(
    fetcher: &Fetcher<T, S>,
    api: &TicketApi,
    id: u64,
) -> Result<RawTicket, FetchError>
where
    T: HttpTransport,
    S: Sleeper,
{
    fetch_single(fetcher, &api.ticket_url(id))
}

/// Probes the collection endpoint once with the configured credentials.
pub fn validate_credentials<T, S>(fetcher: &Fetcher<T, S>, api: &TicketApi) -> Result<(), FetchError>
where
    T: HttpTransport,
    S: Sleeper,
{
    fetcher.fetch(&api.tickets_url())?;
    tracing::debug!("Credentials accepted by {api}");
    Ok(())
}

/// Runs the height check, then pages through `table`.
pub fn render_paged<F>(
    table: &TicketTable,
    input: &mut dyn LineSource,
    surface: &mut dyn Surface,
    rows: F,
) -> anyhow::Result<()>
where
    F: FnMut() -> u16,
{
    check_window(rows, &mut *input, &mut *surface)?;
    run_pager(table, input, surface)
}

pub fn render_single(ticket: &RawTicket, columns: u16, out: &mut dyn Write) -> anyhow::Result<()> {
    write_single(ticket, columns, out)
}

/// The line shown to the user when a fetch fails.
pub fn describe_error(err: &FetchError) -> String {
    match err {
        FetchError::NotFound => NOT_FOUND_MESSAGE.to_string(),
        FetchError::Api(_) | FetchError::RateLimitExhausted { .. } => match err.status() {
            Some(status) => format!(
                "API request trouble encountered, status code: {}. Please try again.",
                status.as_u16()
            ),
            None => format!("API request trouble encountered: {err}. Please try again."),
        },
        other => format!("API request trouble encountered: {other}. Please try again."),
    }
}
