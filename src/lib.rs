//! Terminal viewer for the tickets of a Zendesk-style account.
//!
//! Tickets are downloaded through [`fetch::Fetcher`], which waits out rate
//! limiting, following the `next_page` cursors of the collection endpoint
//! ([`walker`]). The records are projected onto a fixed column set
//! ([`normalize`]) and shown 25 rows at a time by the [`pager`], which
//! redraws in place on an erasable [`terminal::Surface`].

pub mod cmd;
pub mod decoder;
pub mod fetch;
pub mod http;
pub mod ini;
pub mod normalize;
pub mod pager;
pub mod profile;
pub mod render;
pub mod repl;
pub mod stdio;
pub mod terminal;
pub mod url;
pub mod viewer;
pub mod walker;
pub mod window;
