use crate::ini::DEFAULT_INI_SECTION;
use crate::profile::ProfileSettings;

use std::ffi::OsString;

pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    #[clap(
        help = "command to run once instead of the interactive prompt (all, select <id>, menu)"
    )]
    command: Vec<String>,
    #[clap(short = 'p', long, default_value = DEFAULT_INI_SECTION, help = "profile name")]
    profile: String,
    #[clap(short = 's', long, help = "Zendesk subdomain, e.g. 'acme' for acme.zendesk.com")]
    subdomain: Option<String>,
    #[clap(short = 'e', long, help = "login email address")]
    email: Option<String>,
    #[clap(short = 't', long, help = "API token")]
    token: Option<String>,
    #[clap(long, help = "API base URL, takes precedence over the subdomain")]
    base_url: Option<String>,
    #[clap(
        short = 'v',
        long,
        help = "Print verbose message",
        default_value = "false"
    )]
    verbose: bool,
}

#[derive(Debug)]
pub struct CommandLineArgs {
    command: Vec<String>,
    profile: String,
    settings: ProfileSettings,
    verbose: bool,
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            command: args.command,
            profile: args.profile,
            settings: ProfileSettings {
                subdomain: args.subdomain,
                email: args.email,
                api_token: args.token,
                base_url: args.base_url,
            },
            verbose: args.verbose,
        }
    }
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        ClapArgs::parse().into()
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::parse_from(itr).into()
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Connection settings given as flags.
    pub fn settings(&self) -> &ProfileSettings {
        &self.settings
    }

    /// The one-shot command line, if any words followed the options.
    pub fn command(&self) -> Option<String> {
        if self.command.is_empty() {
            None
        } else {
            Some(self.command.join(" "))
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
