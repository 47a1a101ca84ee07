use anyhow::{bail, Result};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::{filter::Directive, fmt::time::ChronoLocal, EnvFilter};

use tixview::cmd::CommandLineArgs;
use tixview::fetch::Fetcher;
use tixview::http::HttpClient;
use tixview::ini::IniFile;
use tixview::profile::{Profile, ProfileError, ProfileSettings, ENV_API_TOKEN, ENV_EMAIL, ENV_SUBDOMAIN};
use tixview::repl::Repl;
use tixview::stdio::{ask_binary, ask_string, StdinLines};
use tixview::terminal::TerminalSurface;
use tixview::viewer::validate_credentials;

fn main() -> Result<ExitCode> {
    let args = CommandLineArgs::parse();
    init_tracing_subscriber(args.verbose());

    let profile_path = IniFile::default_path();
    let profile = resolve_profile(&args, &profile_path)?;
    tracing::debug!("Using {profile:?}");

    let fetcher = Fetcher::new(HttpClient::new(&profile)?);
    if let Err(e) = validate_credentials(&fetcher, profile.api()) {
        match e.status() {
            Some(status) => eprintln!("Authentication failed, status code: {}", status.as_u16()),
            None => eprintln!("Authentication failed: {e:#}"),
        }
        eprintln!("Exiting Ticket Viewer...");
        return Ok(ExitCode::FAILURE);
    }

    let mut repl = Repl::new(
        fetcher,
        profile.api().clone(),
        StdinLines::new(),
        TerminalSurface::new(),
    );
    match args.command() {
        Some(line) => {
            repl.execute_line(&line)?;
        }
        None => {
            repl.print_welcome(profile.account(), profile.email())?;
            repl.run()?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing_subscriber(verbose: bool) {
    let var = format!("{}_LOG_LEVEL", env!("CARGO_PKG_NAME").to_uppercase());
    let default_level = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_env(&var).unwrap_or_else(|_| EnvFilter::new(default_level));

    let filter = ["reqwest", "hyper", "hyper_util", "rustls"]
        .into_iter()
        .filter_map(|target| format!("{target}=warn").parse::<Directive>().ok())
        .fold(filter, |filter, directive| filter.add_directive(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_timer(ChronoLocal::rfc_3339())
        .init();
}

/// Command-line flags, then environment, then the profile file.
fn resolve_profile(args: &CommandLineArgs, profile_path: &str) -> Result<Profile> {
    let ini = IniFile::load_profile(profile_path, args.profile())?.unwrap_or_default();
    let settings = args
        .settings()
        .clone()
        .or(ProfileSettings::from_env())
        .or(ini);

    match Profile::from_settings(settings.clone()) {
        Ok(profile) => Ok(profile),
        Err(ProfileError::Incomplete(missing)) if io::stdin().is_terminal() => {
            tracing::debug!("Incomplete profile, missing {missing:?}");
            let settings = ask_settings(settings, args.profile(), profile_path)?;
            Ok(Profile::from_settings(settings)?)
        }
        Err(ProfileError::Incomplete(missing)) => bail!(
            "Missing {} for profile '{}'. Pass them as options, set {ENV_SUBDOMAIN}, \
             {ENV_EMAIL} and {ENV_API_TOKEN}, or add them to {profile_path}.",
            missing.join(", "),
            args.profile()
        ),
        Err(e) => Err(e.into()),
    }
}

/// First-run setup: asks for whatever is missing and offers to save it.
fn ask_settings(
    mut settings: ProfileSettings,
    profile_name: &str,
    profile_path: &str,
) -> Result<ProfileSettings> {
    let mut input = StdinLines::new();
    let mut out = io::stderr();
    eprintln!("Looks like the '{profile_name}' profile is not configured yet. Let's create it now.");

    if !settings.has_location() {
        settings.subdomain = ask_string(&mut input, &mut out, "subdomain: ")?;
    }
    if settings.email.is_none() {
        settings.email = ask_string(&mut input, &mut out, "email: ")?;
    }
    if settings.api_token.is_none() {
        settings.api_token = ask_string(&mut input, &mut out, "API token: ")?;
    }

    let missing = settings.missing();
    if !missing.is_empty() {
        bail!("Setup aborted, missing {}", missing.join(", "));
    }

    let question = format!("Save these settings as profile '{profile_name}' in {profile_path}? [y/N]: ");
    if ask_binary(&mut input, &mut out, &question)? {
        IniFile::add_profile(profile_path, profile_name, &settings)?;
    }
    Ok(settings)
}
