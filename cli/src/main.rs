//! Dicer CLI - console front end for the roll pipeline.
//!
//! `dicer roll` runs a single explicit roll command. `dicer chat` reads chat
//! lines from stdin and answers the ones that are roll invocations, the way
//! a bot would in a channel. Private messages for hidden rolls are printed
//! with a `[private → user]` marker.

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dicer_engine::{
    ChatDelivery, DeliveryFut, DicerConfig, InboundMessage, RequestContext, RollService,
    Settings, command_request,
};

#[derive(Parser, Debug)]
#[command(name = "dicer", about = "Roll dice the way the chat bot does", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Roll one expression")]
    Roll(RollArgs),
    #[command(about = "Read chat messages from stdin and answer roll invocations")]
    Chat(ChatArgs),
}

#[derive(clap::Args, Debug)]
struct RollArgs {
    /// Dice expression, optionally with a `times#` prefix
    expression: Option<String>,

    /// Reason shown in the reply
    reason: Option<String>,

    /// Send the result privately and only announce the roll
    #[arg(long = "rh")]
    hidden: bool,

    /// Invoking user name
    #[arg(long, default_value = "player")]
    user: String,

    /// Nickname in the current channel
    #[arg(long)]
    nickname: Option<String>,
}

#[derive(clap::Args, Debug)]
struct ChatArgs {
    /// Invoking user name
    #[arg(long, default_value = "player")]
    user: String,

    /// Treat every line as addressed to the bot, as in a direct conversation
    #[arg(long)]
    direct: bool,
}

/// Prints private messages to stdout instead of a chat platform.
struct ConsoleDelivery;

impl ChatDelivery for ConsoleDelivery {
    fn send_private<'a>(&'a self, user_id: &'a str, text: &'a str) -> DeliveryFut<'a> {
        Box::pin(async move {
            println!("[private → {user_id}] {text}");
            Ok(())
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_dicer_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Replies go to stdout; logs must stay off it.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_dicer_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in dicer_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn dicer_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: next to the config file, ~/.dicer/logs/dicer.log
    if let Some(config_path) = DicerConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("dicer.log"));
    }

    // Fallback: ./.dicer/logs/dicer.log
    candidates.push(PathBuf::from(".dicer").join("logs").join("dicer.log"));

    candidates
}

fn load_settings() -> Result<Settings> {
    match DicerConfig::load()? {
        Some(config) => config.settings().context("invalid dicer configuration"),
        None => Ok(Settings::default()),
    }
}

async fn run_roll(service: &RollService, args: RollArgs) -> Result<()> {
    let mut ctx = RequestContext::new(args.user.clone(), args.user);
    if let Some(nickname) = args.nickname {
        ctx = ctx.with_nickname(nickname);
    }

    let payload: Vec<String> = args.expression.into_iter().chain(args.reason).collect();
    let mut request = command_request(&payload.join(" "));
    request.hidden |= args.hidden;

    let reply = service.execute(request, &ctx, &ConsoleDelivery).await?;
    println!("{reply}");
    Ok(())
}

async fn run_chat(service: &RollService, args: ChatArgs) -> Result<()> {
    let ctx = RequestContext::new(args.user.clone(), args.user);
    let settings = service.settings();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let mut message = InboundMessage::from_chat(&line, &settings.bot_name, &settings.prefixes);
        message.addressed |= args.direct;

        match service.handle_message(&message, &ctx, &ConsoleDelivery).await {
            Ok(Some(reply)) => println!("{reply}"),
            Ok(None) => {}
            Err(err) => eprintln!("{err}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let service = RollService::with_default_evaluator(load_settings()?);

    match cli.command {
        Commands::Roll(args) => run_roll(&service, args).await,
        Commands::Chat(args) => run_chat(&service, args).await,
    }
}
