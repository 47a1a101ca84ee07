//! Follows `next_page` cursors across the ticket collection.

use crate::fetch::{FetchError, Fetcher, Sleeper};
use crate::http::HttpTransport;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::Write;

/// A ticket exactly as the API returned it.
pub type RawTicket = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct TicketPage {
    tickets: Vec<RawTicket>,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SingleTicket {
    ticket: RawTicket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    Collection,
    Single,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Walked {
    Collection(Vec<RawTicket>),
    Single(RawTicket),
}

pub fn walk<T, S>(
    fetcher: &Fetcher<T, S>,
    target: &str,
    mode: WalkMode,
    progress: &mut dyn Write,
) -> Result<Walked, FetchError>
where
    T: HttpTransport,
    S: Sleeper,
{
    match mode {
        WalkMode::Collection => walk_collection(fetcher, target, progress).map(Walked::Collection),
        WalkMode::Single => fetch_single(fetcher, target).map(Walked::Single),
    }
}

/// Downloads every page starting at `target`. Nothing is returned unless
/// the whole chain succeeds.
pub fn walk_collection<T, S>(
    fetcher: &Fetcher<T, S>,
    target: &str,
    progress: &mut dyn Write,
) -> Result<Vec<RawTicket>, FetchError>
where
    T: HttpTransport,
    S: Sleeper,
{
    let mut tickets = Vec::new();
    let mut meter = DownloadProgress::new(progress);
    let mut visited = HashSet::new();
    let mut next = Some(target.to_string());

    while let Some(url) = next.take() {
        if !visited.insert(url.clone()) {
            return Err(FetchError::CursorLoop(url));
        }

        let res = fetcher.fetch(&url)?;
        let page: TicketPage = serde_json::from_str(res.body())?;
        tracing::debug!(
            "Page {} from {url}: {} tickets, next: {:?}",
            visited.len(),
            page.tickets.len(),
            page.next_page
        );

        meter.record(page.count, page.tickets.len());
        tickets.extend(page.tickets);
        next = page.next_page;
    }

    meter.finish();
    Ok(tickets)
}

/// Fetches one ticket. A 404 here means the id does not exist.
pub fn fetch_single<T, S>(fetcher: &Fetcher<T, S>, target: &str) -> Result<RawTicket, FetchError>
where
    T: HttpTransport,
    S: Sleeper,
{
    let res = match fetcher.fetch(target) {
        Ok(res) => res,
        Err(FetchError::Api(status)) if status == StatusCode::NOT_FOUND => {
            return Err(FetchError::NotFound)
        }
        Err(e) => return Err(e),
    };
    let single: SingleTicket = serde_json::from_str(res.body())?;
    Ok(single.ticket)
}

/// Writes `"{pct}% downloaded..."` lines that overwrite each other via `\r`.
pub struct DownloadProgress<'a> {
    out: &'a mut dyn Write,
    declared_total: Option<u64>,
    received: u64,
    pages: u32,
}

impl<'a> DownloadProgress<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        DownloadProgress {
            out,
            declared_total: None,
            received: 0,
            pages: 0,
        }
    }

    /// The declared total is taken from the first page only.
    pub fn record(&mut self, count: Option<u64>, page_len: usize) {
        if self.pages == 0 {
            self.declared_total = count;
        }
        self.pages += 1;
        self.received += page_len as u64;

        let line = match self.percent() {
            Some(pct) => format!("{pct:.1}% downloaded...\r"),
            None => format!("{} tickets downloaded...\r", self.received),
        };
        // Progress is cosmetic, a closed sink must not fail the download.
        let _ = self.out.write_all(line.as_bytes());
        let _ = self.out.flush();
    }

    pub fn percent(&self) -> Option<f64> {
        let total = self.declared_total?;
        if total == 0 {
            return Some(100.0);
        }
        let pct = self.received as f64 / total as f64 * 100.0;
        Some((pct * 10.0).round_ties_even() / 10.0)
    }

    fn finish(&mut self) {
        let _ = self.out.flush();
    }
}
