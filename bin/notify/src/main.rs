//! Sends one WhatsApp message and exits with its delivery status.

use clap::Parser;
use concierge_core::Result;
use concierge_notify::{Notifier, NotifyError, WhatsAppConfig, WhatsAppNotifier};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "concierge-notify")]
#[command(about = "Send a WhatsApp text message", long_about = None)]
struct Cli {
    /// Recipient phone number in international format, e.g. +123456789
    #[arg(long)]
    to: String,

    /// Message text
    message: String,

    /// Directory for the delivery log
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

/// Environment-provided settings, read from `WHATSAPP__*`.
#[derive(Debug, Deserialize)]
struct NotifyConfig {
    whatsapp: WhatsAppConfig,
}

impl NotifyConfig {
    fn from_env() -> Result<Self, NotifyError> {
        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| NotifyError::InvalidConfig {
                reason: e.to_string(),
            })?;
        Ok(config)
    }
}

/// Logs to stderr and, when the directory is usable, to a timestamped file.
fn init_tracing(log_dir: &Path) {
    let file = std::fs::create_dir_all(log_dir)
        .ok()
        .and_then(|()| {
            RollingFileAppender::builder()
                .filename_prefix(format!(
                    "whatsapp_logs_{}",
                    chrono::Local::now().format("%Y%m%d_%H%M%S")
                ))
                .filename_suffix("log")
                .build(log_dir)
                .ok()
        })
        .map(|writer| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
        });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file)
        .init();
}

async fn send(cli: &Cli) -> Result<bool, NotifyError> {
    dotenvy::dotenv().ok();
    let config = NotifyConfig::from_env()?;
    let notifier = WhatsAppNotifier::new(config.whatsapp)?;
    Ok(notifier.send(&cli.to, &cli.message).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_dir);

    match send(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Notifier unavailable");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_recipient_and_message() {
        let cli = Cli::try_parse_from(["concierge-notify", "--to", "+123456789", "Hello there"])
            .expect("parse");
        assert_eq!(cli.to, "+123456789");
        assert_eq!(cli.message, "Hello there");
        assert_eq!(cli.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn recipient_is_required() {
        assert!(Cli::try_parse_from(["concierge-notify", "Hello"]).is_err());
    }
}
