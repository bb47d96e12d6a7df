//! notifyctl - admin CLI for targeted community push notifications.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use notify_config::{Config, Paths};
use notify_engine::{AnnouncementPush, ApprovalPush};
use std::collections::BTreeMap;

/// Send targeted push notifications to community residents.
#[derive(Parser)]
#[command(name = "notifyctl")]
#[command(about = "Send targeted community push notifications")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an announcement push to the selected audiences
    Announce {
        /// Announcement document id
        #[arg(long)]
        id: String,

        /// Notification title
        #[arg(long)]
        title: String,

        /// Notification body
        #[arg(long)]
        body: String,

        /// Audience label (repeatable)
        #[arg(long = "audience")]
        audiences: Vec<String>,

        /// Admin user id, recorded in the send log
        #[arg(long)]
        requested_by: Option<String>,

        /// Extra data entry as key=value (repeatable)
        #[arg(long = "data", value_parser = parse_key_value)]
        data: Vec<(String, String)>,
    },

    /// Send an account-approved push to one user's devices
    Approve {
        /// Approval request document id
        #[arg(long)]
        request: String,

        /// User id of the approved account
        #[arg(long)]
        user: String,

        /// Notification title
        #[arg(long, default_value = "Account approved")]
        title: String,

        /// Notification body
        #[arg(long, default_value = "Your account has been approved. Welcome!")]
        body: String,
    },

    /// Recommend audience labels for announcement text
    Recommend {
        /// Announcement text to match against the keyword rules
        text: String,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;
    notify_config::init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));

    match cli.command {
        Commands::Announce {
            id,
            title,
            body,
            audiences,
            requested_by,
            data,
        } => {
            let data = if data.is_empty() {
                None
            } else {
                Some(data.into_iter().collect::<BTreeMap<_, _>>())
            };
            let push = AnnouncementPush {
                announcement_id: id,
                title,
                body,
                audiences,
                requested_by,
                data,
            };
            commands::announce(&config, &paths, &push, &cli.format).await
        }
        Commands::Approve {
            request,
            user,
            title,
            body,
        } => {
            let push = ApprovalPush {
                request_id: request,
                user_id: user,
                title,
                body,
            };
            commands::approve(&config, &paths, &push, &cli.format).await
        }
        Commands::Recommend { text } => commands::recommend(&config, &paths, &text, &cli.format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("deepLink=app://x").unwrap(),
            ("deepLink".to_string(), "app://x".to_string())
        );
        assert_eq!(
            parse_key_value("k=v=w").unwrap(),
            ("k".to_string(), "v=w".to_string())
        );
        assert!(parse_key_value("no-equals").is_err());
    }
}
