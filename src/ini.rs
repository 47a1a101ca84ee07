use crate::profile::ProfileSettings;

use anyhow::{Context, Result};
use ini::{Ini, Properties};
use std::path::Path;

pub const DEFAULT_INI_FILE_PATH: &str = "~/.tixview";
pub const DEFAULT_INI_SECTION: &str = "default";
pub const ENV_PROFILE_PATH: &str = "TIXVIEW_PROFILE_PATH";

const INI_SUBDOMAIN: &str = "subdomain";
const INI_EMAIL: &str = "email";
const INI_API_TOKEN: &str = "api_token";
const INI_BASE_URL: &str = "base_url";

pub struct IniFile;

impl IniFile {
    /// `$TIXVIEW_PROFILE_PATH` if set, otherwise `~/.tixview`.
    pub fn default_path() -> String {
        std::env::var(ENV_PROFILE_PATH)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INI_FILE_PATH.to_string())
    }

    pub fn load_profile(file_path: &str, name: &str) -> Result<Option<ProfileSettings>> {
        let Some(ini) = Self::load(file_path)? else {
            return Ok(None);
        };
        let Some(section) = ini.section(Some(name)) else {
            tracing::debug!("Profile [{name}] not found in {file_path}");
            return Ok(None);
        };

        fn get(section: &Properties, key: &str) -> Option<String> {
            section.get(key).map(|s| s.trim().to_string())
        }

        Ok(Some(ProfileSettings {
            subdomain: get(section, INI_SUBDOMAIN),
            email: get(section, INI_EMAIL),
            api_token: get(section, INI_API_TOKEN),
            base_url: get(section, INI_BASE_URL),
        }))
    }

    /// Writes `profile` as section `name`, replacing a previous section of
    /// that name and keeping every other section of the file.
    pub fn add_profile(file_path: &str, name: &str, profile: &ProfileSettings) -> Result<()> {
        let mut conf = Self::load(file_path)?.unwrap_or_default();
        conf.delete(Some(name));

        let mut sect = conf.with_section(Some(name));
        let fields = [
            (INI_SUBDOMAIN, &profile.subdomain),
            (INI_EMAIL, &profile.email),
            (INI_API_TOKEN, &profile.api_token),
            (INI_BASE_URL, &profile.base_url),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                sect.set(key, value.as_str());
            }
        }

        let path = shellexpand::tilde(file_path).to_string();
        conf.write_to_file(&path)
            .with_context(|| format!("Failed to write profile file {path}"))?;
        restrict_permissions(&path)?;
        tracing::info!("Saved profile [{name}] to {path}");
        Ok(())
    }

    fn load(file_path: &str) -> Result<Option<Ini>> {
        let path = shellexpand::tilde(file_path).to_string();
        if !Path::new(&path).exists() {
            tracing::debug!("Profile file not found: {path}");
            return Ok(None);
        }
        let ini = Ini::load_from_file(&path)
            .with_context(|| format!("Failed to read profile file {path}"))?;
        Ok(Some(ini))
    }
}

// The file holds an API token.
#[cfg(unix)]
fn restrict_permissions(path: &str) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions of {path}"))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &str) -> Result<()> {
    Ok(())
}
