use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rulebot_client::{
    config::{Config, LogFormat},
    rulebot::RulebotClient,
    session::{ConversationTurn, Role, Session, SubmitOutcome},
    settings::{SettingName, CHAT_MODELS, EMBEDDER_MODELS},
};

/// Ask the rulebook service questions from the terminal.
#[derive(Parser, Debug)]
#[command(name = "rulebot-client", version, about)]
struct Cli {
    /// Append the retrieval trace to every answer
    #[arg(long)]
    debug: bool,

    /// Chat model to start with
    #[arg(long)]
    model: Option<String>,

    /// Service base URL (overrides RULEBOT_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,
}

const HELP: &str = "\
Commands:
  /set <name> <value>   change a setting for the next question
  /settings             show current settings
  /models               list known models
  /history              print the conversation so far
  /help                 show this help
  /quit                 exit
Anything else is sent as a question.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(base_url) = cli.base_url {
        config.service.base_url = base_url.trim_end_matches('/').to_string();
    }

    // Initialize logging
    init_logging(&config);

    for rejected in &config.rejected_overrides {
        warn!(
            var = rejected.var,
            value = %rejected.value,
            error = %rejected.reason,
            "Ignoring invalid setting override"
        );
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.service.base_url,
        "Rulebot client starting..."
    );

    let client = match RulebotClient::new(&config.service, config.request.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to initialize service client");
            return Err(e.into());
        }
    };

    let session = Session::new(client, config.settings.clone());
    if cli.debug {
        session.update_setting(SettingName::Debug.as_str(), "on")?;
    }
    if let Some(model) = cli.model {
        session.update_setting(SettingName::Model.as_str(), &model)?;
    }

    let mut stdout = tokio::io::stdout();
    for turn in session.history() {
        print_turn(&mut stdout, &turn).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        if let Some(command) = input.strip_prefix('/') {
            let mut parts = command.splitn(3, char::is_whitespace);
            match (parts.next(), parts.next(), parts.next()) {
                (Some("quit" | "exit"), _, _) => break,
                (Some("help"), _, _) => write_line(&mut stdout, HELP).await?,
                (Some("settings"), _, _) => {
                    let settings = session.settings();
                    for name in SettingName::ALL {
                        let text = format!("{:<22}{}", name.as_str(), settings.value_of(name));
                        write_line(&mut stdout, &text).await?;
                    }
                }
                (Some("models"), _, _) => {
                    write_line(&mut stdout, "Chat models:").await?;
                    for model in CHAT_MODELS {
                        let text = format!("  {:<16}{}", model.value, model.label);
                        write_line(&mut stdout, &text).await?;
                    }
                    write_line(&mut stdout, "Embedder models:").await?;
                    for model in EMBEDDER_MODELS {
                        let text = format!("  {} ({})", model.value, model.label);
                        write_line(&mut stdout, &text).await?;
                    }
                }
                (Some("history"), _, _) => {
                    for turn in session.history() {
                        print_turn(&mut stdout, &turn).await?;
                    }
                }
                (Some("set"), Some(name), Some(value)) => {
                    match session.update_setting(name, value) {
                        Ok(()) => write_line(&mut stdout, &format!("{name} updated")).await?,
                        Err(e) => write_line(&mut stdout, &e.to_string()).await?,
                    }
                }
                _ => write_line(&mut stdout, HELP).await?,
            }
            continue;
        }

        match session.submit(&line).await {
            SubmitOutcome::Answered(turn) | SubmitOutcome::Failed(turn) => {
                print_turn(&mut stdout, &turn).await?
            }
            SubmitOutcome::Rejected(_) => {}
        }
    }

    info!(session_id = %session.id(), turns = session.history().len(), "Session ended");
    Ok(())
}

async fn print_turn(stdout: &mut tokio::io::Stdout, turn: &ConversationTurn) -> std::io::Result<()> {
    let speaker = match turn.role() {
        Role::User => "you",
        Role::Assistant => "rulebot",
    };
    write_line(stdout, &format!("{speaker}> {}", turn.content())).await
}

async fn write_line(stdout: &mut tokio::io::Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
