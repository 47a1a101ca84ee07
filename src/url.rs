use anyhow::{anyhow, bail, Result};
use regex::Regex;
use std::fmt::{Display, Formatter};

const API_HOST_SUFFIX: &str = "zendesk.com";
const TICKETS_PATH: &str = "/api/v2/tickets";

const REGEX_PATTERN_SUBDOMAIN: &str = r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$";
const REGEX_PATTERN_BASE_URL: &str =
    r"^(?P<scheme>https?)://(?P<host>[^:/\?#\s]+)(:(?P<port>\d+))?(?P<path>/[^\?#\s]*)?$";

/// Location of the ticket endpoints of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketApi {
    base: String,
}

impl TicketApi {
    pub fn for_subdomain(subdomain: &str) -> Result<Self> {
        let subdomain = subdomain.trim();
        let re = Regex::new(REGEX_PATTERN_SUBDOMAIN)?;
        if !re.is_match(subdomain) {
            bail!("Invalid subdomain: '{subdomain}'");
        }
        Ok(TicketApi {
            base: format!("https://{}.{API_HOST_SUFFIX}", subdomain.to_lowercase()),
        })
    }

    /// Points the client at an explicit host, e.g. a proxy or a sandbox.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let re = Regex::new(REGEX_PATTERN_BASE_URL)?;
        let caps = re
            .captures(base_url.trim())
            .ok_or_else(|| anyhow!("Invalid base URL: '{base_url}'"))?;
        if let Some(port) = caps.name("port") {
            port.as_str()
                .parse::<u16>()
                .map_err(|_| anyhow!("Invalid port in base URL: '{base_url}'"))?;
        }

        let base = base_url.trim().trim_end_matches('/').to_string();
        Ok(TicketApi { base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn tickets_url(&self) -> String {
        format!("{}{TICKETS_PATH}.json", self.base)
    }

    pub fn ticket_url(&self, id: u64) -> String {
        format!("{}{TICKETS_PATH}/{id}.json", self.base)
    }
}

impl Display for TicketApi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdomain_builds_zendesk_urls() {
        let api = TicketApi::for_subdomain("Acme").unwrap();
        assert_eq!(api.base(), "https://acme.zendesk.com");
        assert_eq!(
            api.tickets_url(),
            "https://acme.zendesk.com/api/v2/tickets.json"
        );
        assert_eq!(
            api.ticket_url(42),
            "https://acme.zendesk.com/api/v2/tickets/42.json"
        );
    }

    #[test]
    fn invalid_subdomains_are_rejected() {
        for s in ["", "-acme", "acme-", "ac me", "acme.evil.com", "acme/"] {
            assert!(TicketApi::for_subdomain(s).is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let api = TicketApi::with_base_url("http://127.0.0.1:8080/").unwrap();
        assert_eq!(api.base(), "http://127.0.0.1:8080");
        assert_eq!(api.tickets_url(), "http://127.0.0.1:8080/api/v2/tickets.json");
        assert_eq!(api.to_string(), "http://127.0.0.1:8080");
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let api = TicketApi::with_base_url("https://proxy.example.com/zendesk").unwrap();
        assert_eq!(
            api.ticket_url(7),
            "https://proxy.example.com/zendesk/api/v2/tickets/7.json"
        );
    }

    #[test]
    fn invalid_base_urls_are_rejected() {
        for s in ["acme.zendesk.com", "ftp://host", "http://", "http://host:99999", "https://a b"] {
            assert!(TicketApi::with_base_url(s).is_err(), "accepted {s:?}");
        }
    }
}
