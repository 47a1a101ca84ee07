use crate::decoder::{decode_body, ACCEPT_ENCODINGS};

use anyhow::{Context, Result};
use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING},
    StatusCode,
};
use std::fmt::Debug;
use std::time::Duration;

const ACCEPT_JSON: &str = "application/json";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub trait HttpConnectionProfile {
    fn user(&self) -> Option<String>;
    fn password(&self) -> Option<&String>;
}

/// Performs a single GET. Status codes are not interpreted here.
pub trait HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        (**self).get(url)
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: String) -> Self {
        HttpResponse {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub struct HttpClient {
    client: Client,
    user: Option<String>,
    password: Option<String>,
}

impl Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("client", &"Client")
            .field("user", &self.user)
            .finish()
    }
}

impl HttpClient {
    pub fn new(profile: &impl HttpConnectionProfile) -> Result<Self> {
        let client = Self::build_client()?;
        Ok(HttpClient {
            client,
            user: profile.user(),
            password: profile.password().cloned(),
        })
    }

    fn build_client() -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODINGS));

        Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")
    }
}

impl HttpTransport for HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        tracing::debug!("GET {url}");
        let mut req_builder = self.client.get(url);
        if let Some(user) = &self.user {
            req_builder = req_builder.basic_auth(user, self.password.as_ref());
        }

        let res = req_builder
            .send()
            .with_context(|| format!("GET {url} failed"))?;
        let status = res.status();
        let headers = res.headers().clone();
        let body_bytes = res
            .bytes()
            .with_context(|| format!("Failed to read response body of {url}"))?;
        let content_encoding = headers.get(CONTENT_ENCODING).and_then(|v| v.to_str().ok());

        // Error bodies are informational only, so a broken one is not fatal.
        let body = match decode_body(&body_bytes, content_encoding) {
            Ok(body) => body,
            Err(e) if !status.is_success() => {
                tracing::debug!("Dropping undecodable {status} body: {e}");
                String::new()
            }
            Err(e) => return Err(e),
        };
        tracing::debug!("{status} from {url} ({} bytes)", body.len());

        Ok(HttpResponse::new(status, headers, body))
    }
}
