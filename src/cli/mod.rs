//! CLI mode for fitpower-agent: drives the agent's handlers from a terminal
//! against a live origin.

mod report;
mod terminal;

use std::path::PathBuf;

pub use terminal::ConsoleHost;

use crate::request::{Destination, FetchRequest, RequestMode};
use crate::{Agent, AgentConfig, Notification, PushPayload};

/// Subcommand to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Precache into the current bucket.
    Install,
    /// Prune stale buckets.
    Activate,
    /// Run one or more requests through the interceptor, in order.
    Fetch {
        paths: Vec<String>,
        navigate: bool,
        destination: Option<Destination>,
    },
    /// Run the push handler with an optional JSON payload.
    Push { payload: Option<String> },
    /// Run the click handler for a notification targeting `url`.
    Click { url: String },
    /// Print the effective configuration.
    Config,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub origin: Option<String>,
    /// URLs of simulated open windows for `click`.
    pub windows: Vec<String>,
    pub command: Command,
}

/// Prints usage to stderr.
pub fn print_usage() {
    eprintln!("Usage: fitpower-agent [OPTIONS] <COMMAND> [ARGS]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  install                     Precache resources into the current cache");
    eprintln!("  activate                    Delete caches from previous versions");
    eprintln!("  fetch <path>...             Run requests through the interceptor");
    eprintln!("      --navigate              Treat requests as page navigations");
    eprintln!("      --style                 Treat requests as stylesheets");
    eprintln!("      --destination <KIND>    Request destination (style, script, image, ...)");
    eprintln!("  push [json]                 Handle a push delivery");
    eprintln!("  click <url>                 Handle a click on a notification for <url>");
    eprintln!("  config                      Print the effective configuration");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <PATH>             Configuration file (default: <config dir>/fitpower-agent/agent.toml)");
    eprintln!("  --origin <URL>              Application origin (default: http://localhost:8080)");
    eprintln!("  --window <URL>              Simulate an open window (repeatable)");
    eprintln!("  -h, --help                  Show this help");
}

impl CliArgs {
    /// Parses arguments (without the program name).
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid or missing argument.
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config_path = None;
        let mut origin = None;
        let mut windows = Vec::new();
        let mut navigate = false;
        let mut destination = None;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if !arg.starts_with('-') {
                positional.push(arg);
                continue;
            }
            match arg.as_str() {
                "--config" => {
                    config_path = Some(PathBuf::from(value_for(&mut args, "--config")?));
                }
                "--origin" => origin = Some(value_for(&mut args, "--origin")?),
                "--window" => windows.push(value_for(&mut args, "--window")?),
                "--navigate" => navigate = true,
                "--style" => destination = Some(Destination::Style),
                "--destination" => {
                    let kind = value_for(&mut args, "--destination")?;
                    destination = Some(Destination::parse(&kind));
                }
                other => return Err(format!("unknown option {other}")),
            }
        }

        let mut positional = positional.into_iter();
        let command = match positional.next().as_deref() {
            Some("install") => Command::Install,
            Some("activate") => Command::Activate,
            Some("config") => Command::Config,
            Some("fetch") => {
                let paths: Vec<String> = positional.by_ref().collect();
                if paths.is_empty() {
                    return Err("fetch requires at least one path".to_string());
                }
                Command::Fetch {
                    paths,
                    navigate,
                    destination,
                }
            }
            Some("push") => Command::Push {
                payload: positional.next(),
            },
            Some("click") => Command::Click {
                url: positional
                    .next()
                    .ok_or_else(|| "click requires a url".to_string())?,
            },
            Some(other) => return Err(format!("unknown command {other}")),
            None => return Err("missing command".to_string()),
        };

        if let Some(extra) = positional.next() {
            return Err(format!("unexpected argument {extra}"));
        }

        Ok(Self {
            config_path,
            origin,
            windows,
            command,
        })
    }
}

fn value_for(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("{flag} requires a value"))
}

/// Loads configuration, applying command-line overrides.
fn load_config(args: &CliArgs) -> crate::Result<AgentConfig> {
    let mut config = match &args.config_path {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::load_default()?,
    };
    if let Some(origin) = &args.origin {
        config.network.origin.clone_from(origin);
    }
    Ok(config)
}

/// Builds the request the page would issue for `path`.
fn build_request(
    config: &AgentConfig,
    path: &str,
    navigate: bool,
    destination: Option<&Destination>,
) -> crate::Result<FetchRequest> {
    let url = config.resolve(path)?;
    let request = if navigate {
        FetchRequest::navigate(url)
    } else {
        FetchRequest::get(url).with_mode(RequestMode::SameOrigin)
    };
    Ok(match destination {
        Some(destination) => request.with_destination(destination.clone()),
        None => request,
    })
}

/// Runs the CLI with parsed arguments.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or a handler fails.
pub async fn run(args: CliArgs) -> crate::Result<()> {
    let config = load_config(&args)?;

    if args.command == Command::Config {
        let toml_str = toml::to_string(&config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        print!("{toml_str}");
        return Ok(());
    }

    let agent = Agent::new(config, ConsoleHost::new(&args.windows))?;

    match args.command {
        Command::Install => {
            agent.install().await?;
            println!("Installed {}", agent.cache_name());
        }
        Command::Activate => {
            let deleted = agent.activate().await?;
            report::print_activated(&agent.cache_name(), &deleted);
        }
        Command::Fetch {
            paths,
            navigate,
            destination,
        } => {
            // The bucket lives in memory, so warm it first. An unreachable
            // origin is reported per request below rather than aborting here.
            if let Err(e) = agent.install().await {
                log::warn!("Install failed: {e}");
            }
            agent.activate().await?;

            for path in &paths {
                let request =
                    build_request(agent.config(), path, navigate, destination.as_ref())?;
                match agent.handle_fetch(&request).await {
                    Ok(served) => report::print_served(&request, &served),
                    Err(e) => report::print_failed(&request, &e),
                }
            }
        }
        Command::Push { payload } => {
            agent
                .handle_push(payload.as_deref().map(str::as_bytes))
                .await?;
        }
        Command::Click { url } => {
            let payload = PushPayload {
                url: Some(url),
                ..PushPayload::default()
            };
            let notification = Notification::from_payload(payload, &agent.config().notification);
            let outcome = agent.handle_notification_click(&notification).await?;
            report::print_click(&outcome);
        }
        Command::Config => {}
    }

    Ok(())
}
