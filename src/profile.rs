use crate::http::HttpConnectionProfile;
use crate::url::TicketApi;

use std::fmt::Debug;
use thiserror::Error;

pub const ENV_SUBDOMAIN: &str = "ZCC_SUBDOMAIN";
pub const ENV_EMAIL: &str = "ZCC_EMAIL_ADDRESS";
pub const ENV_API_TOKEN: &str = "ZCC_API_KEY";

/// API tokens authenticate as `{email}/token`.
const TOKEN_USER_SUFFIX: &str = "/token";

/// Connection settings from one source. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSettings {
    pub subdomain: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub base_url: Option<String>,
}

impl ProfileSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        ProfileSettings {
            subdomain: lookup(ENV_SUBDOMAIN),
            email: lookup(ENV_EMAIL),
            api_token: lookup(ENV_API_TOKEN),
            base_url: None,
        }
        .cleaned()
    }

    /// Fills the fields missing here from `fallback`.
    pub fn or(self, fallback: ProfileSettings) -> Self {
        let this = self.cleaned();
        let fallback = fallback.cleaned();
        ProfileSettings {
            subdomain: this.subdomain.or(fallback.subdomain),
            email: this.email.or(fallback.email),
            api_token: this.api_token.or(fallback.api_token),
            base_url: this.base_url.or(fallback.base_url),
        }
    }

    pub fn has_location(&self) -> bool {
        self.subdomain.is_some() || self.base_url.is_some()
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_location() {
            missing.push("subdomain");
        }
        if self.email.is_none() {
            missing.push("email");
        }
        if self.api_token.is_none() {
            missing.push("api_token");
        }
        missing
    }

    fn cleaned(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        ProfileSettings {
            subdomain: clean(self.subdomain),
            email: clean(self.email),
            api_token: clean(self.api_token),
            base_url: clean(self.base_url),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("missing setting(s): {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
    #[error(transparent)]
    InvalidLocation(#[from] anyhow::Error),
}

/// Fully resolved connection profile.
#[derive(Clone)]
pub struct Profile {
    api: TicketApi,
    account: String,
    email: String,
    api_token: String,
}

impl Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("api", &self.api)
            .field("email", &self.email)
            .field("api_token", &"********")
            .finish()
    }
}

impl Profile {
    /// An explicit base URL wins over the subdomain.
    pub fn from_settings(settings: ProfileSettings) -> Result<Self, ProfileError> {
        let settings = settings.cleaned();
        let missing = settings.missing();
        if !missing.is_empty() {
            return Err(ProfileError::Incomplete(missing));
        }

        let (api, account) = match (&settings.base_url, &settings.subdomain) {
            (Some(base_url), _) => {
                let api = TicketApi::with_base_url(base_url)?;
                let account = api.base().to_string();
                (api, account)
            }
            (None, Some(subdomain)) => (TicketApi::for_subdomain(subdomain)?, subdomain.clone()),
            (None, None) => return Err(ProfileError::Incomplete(vec!["subdomain"])),
        };

        let email = settings.email.unwrap_or_default();
        let email = email
            .strip_suffix(TOKEN_USER_SUFFIX)
            .unwrap_or(&email)
            .to_string();

        Ok(Profile {
            api,
            account,
            email,
            api_token: settings.api_token.unwrap_or_default(),
        })
    }

    pub fn api(&self) -> &TicketApi {
        &self.api
    }

    /// Subdomain, or the base URL when one was configured.
    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl HttpConnectionProfile for Profile {
    fn user(&self) -> Option<String> {
        Some(format!("{}{TOKEN_USER_SUFFIX}", self.email))
    }

    fn password(&self) -> Option<&String> {
        Some(&self.api_token)
    }
}
