//! `rollcall` console binary

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use rollcall_cli::{parse_line, seed_store, ConsoleLine, ConsoleTransport};
use rollcall_core::{BotRuntime, ConversationEngine, ConversationId, EngineConfig};
use rollcall_poll::PollRegistry;
use rollcall_sheet::{InMemoryStore, SheetSnapshot};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Command::new("rollcall")
        .version(rollcall_cli::VERSION)
        .about("Record attendance in a sheet through a conversation")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(PathBuf))
                .help("JSON sheet snapshot to start from"),
        )
        .arg(
            Arg::new("dump")
                .long("dump")
                .value_parser(value_parser!(PathBuf))
                .help("Write the sheet as a JSON snapshot on exit"),
        )
        .arg(
            Arg::new("conversation")
                .long("conversation")
                .default_value("console")
                .help("Conversation id used for every console line"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        );

    let matches = cli.get_matches();
    init_tracing(matches.get_count("verbose"));

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let sheet = config.layout.sheet_name.clone();

    let store = Arc::new(InMemoryStore::new());
    if let Some(path) = matches.get_one::<PathBuf>("seed") {
        let snapshot = SheetSnapshot::load(path)
            .with_context(|| format!("reading sheet snapshot {}", path.display()))?;
        let cells = seed_store(&store, &snapshot, &sheet)
            .with_context(|| format!("loading sheet snapshot {}", path.display()))?;
        tracing::info!(cells, "sheet seeded");
    }

    let conversation = ConversationId::new(
        matches
            .get_one::<String>("conversation")
            .map_or("console", String::as_str),
    );
    let transport = Arc::new(ConsoleTransport::stdout());
    let registry = PollRegistry::with_idle_ttl(config.poll_capacity, config.poll_idle_ttl());
    let engine = Arc::new(ConversationEngine::new(
        config,
        store.clone(),
        transport.clone(),
        registry.clone(),
    ));
    let runtime = BotRuntime::new(engine, transport);
    let mut progress = runtime.progress();

    let (sender, receiver) = mpsc::channel(256);
    let worker = tokio::spawn(async move { runtime.run(receiver).await });

    println!("rollcall {} - type /help, or :quit to exit", rollcall_cli::VERSION);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sent: u64 = 0;
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match parse_line(&line) {
            Ok(ConsoleLine::Quit) => break,
            Ok(ConsoleLine::Dump) => {
                // the sheet is read only after every earlier line is handled
                progress
                    .wait_for(|handled| *handled >= sent)
                    .await
                    .context("runtime stopped unexpectedly")?;
                let dump = serde_json::to_string_pretty(&store.snapshot(&sheet))?;
                println!("{dump}");
            }
            Ok(parsed) => {
                if let Some(event) = parsed.into_event(&conversation) {
                    sender.send(event).await.context("runtime stopped unexpectedly")?;
                    sent += 1;
                }
            }
            Err(error) => eprintln!("{error}"),
        }
    }

    drop(sender);
    let stats = worker.await.context("runtime task failed")?;
    tracing::info!(?stats, polls = registry.stats().entry_count, "session finished");

    if let Some(path) = matches.get_one::<PathBuf>("dump") {
        store
            .snapshot(&sheet)
            .save(path)
            .with_context(|| format!("writing sheet snapshot {}", path.display()))?;
        println!("sheet written to {}", path.display());
    }
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
