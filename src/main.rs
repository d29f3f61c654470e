use localmind::client::ResearchClient;
use localmind::config::ClientConfig;
use localmind::models::Endpoint;
use localmind::state::ChatSession;
use localmind::stream::{
    DriveOptions, SessionUpdate, StreamDriver, StreamOutcome, TranscriptChange,
};

use chrono::Local;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
usage: localmind [--rag] [--json] [--query <text>]
       localmind --health | --files | --upload <path> | --delete <name> | --version

Streams answers from the Local Mind research server.
Without --query, reads one query per line from stdin.

environment:
  LOCALMIND_API_BASE           server URL (default http://localhost:8000)
  LOCALMIND_MODE               research | rag
  LOCALMIND_IDLE_TIMEOUT_SECS  seconds of silence before giving up (0 = never)
  LOCALMIND_MAX_FRAME_BYTES    largest accepted frame (0 = unbounded)
  RUST_LOG                     log filter (default warn)";

/// Parsed command line flags
#[derive(Debug, Default)]
struct Args {
    rag: bool,
    json: bool,
    health: bool,
    files: bool,
    upload: Option<PathBuf>,
    delete: Option<String>,
    query: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--rag" => args.rag = true,
            "--json" => args.json = true,
            "--health" => args.health = true,
            "--files" => args.files = true,
            "--upload" => {
                let path = iter
                    .next()
                    .ok_or_else(|| eyre!("--upload needs a file path"))?;
                args.upload = Some(PathBuf::from(path));
            }
            "--delete" => {
                let name = iter
                    .next()
                    .ok_or_else(|| eyre!("--delete needs a file name"))?;
                args.delete = Some(name);
            }
            "--query" | "-q" => {
                let query = iter
                    .next()
                    .ok_or_else(|| eyre!("--query needs a value"))?;
                args.query = Some(query);
            }
            other => return Err(eyre!("unknown argument '{}'\n\n{}", other, USAGE)),
        }
    }

    Ok(args)
}

/// Log to stderr so streamed answers on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Render stream updates as they arrive until the turn finishes.
async fn print_updates(mut rx: mpsc::UnboundedReceiver<SessionUpdate>) {
    let mut stdout = std::io::stdout();

    while let Some(update) = rx.recv().await {
        match update {
            SessionUpdate::Change(TranscriptChange::Token { token, .. }) => {
                print!("{}", token);
                let _ = stdout.flush();
            }
            SessionUpdate::Change(TranscriptChange::SideEvent { event, .. }) => {
                let time = event.observed_at.with_timezone(&Local).format("%H:%M:%S");
                println!("  [{}] {}  ({})", event.kind.label(), event.content, time);
            }
            SessionUpdate::ErrorAppended { text, .. } => {
                println!();
                eprintln!("error: {}", text);
            }
            SessionUpdate::Finished(outcome) => {
                println!();
                match outcome {
                    StreamOutcome::TransportFailed(err) if err.is_retryable() => {
                        eprintln!("({}; sending the query again may work)", err);
                    }
                    StreamOutcome::TransportFailed(err) => eprintln!("({})", err),
                    StreamOutcome::Truncated => {
                        eprintln!("(answer ended early; the server closed the stream)");
                    }
                    StreamOutcome::Completed | StreamOutcome::UpstreamError(_) => {}
                }
                break;
            }
        }
    }
}

async fn run_query<C>(driver: &StreamDriver<C>, session: &mut ChatSession, query: &str)
where
    C: localmind::traits::HttpClient,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_updates(rx));

    if let Err(e) = driver.run_turn(session, query, Some(&tx)).await {
        eprintln!("{}", e);
    }

    drop(tx);
    let _ = printer.await;
}

async fn run(args: Args) -> Result<()> {
    let mut config = ClientConfig::from_env()?;
    if args.rag {
        config = config.with_endpoint(Endpoint::Rag);
    }

    let driver = StreamDriver::new(
        ResearchClient::from_config(&config),
        DriveOptions::from(&config),
    );
    let client = driver.client();

    if args.health {
        let healthy = client.health_check().await.unwrap_or(false);
        println!(
            "{} is {}",
            client.base_url(),
            if healthy { "healthy" } else { "unreachable" }
        );
        std::process::exit(if healthy { 0 } else { 1 });
    }

    if args.files {
        for file in client.list_rag_files().await? {
            println!("{}", file);
        }
        return Ok(());
    }

    if let Some(path) = args.upload {
        println!("{}", client.upload_rag_file(&path).await?);
        return Ok(());
    }

    if let Some(name) = args.delete {
        client.delete_rag_file(&name).await?;
        println!("deleted {}", name);
        return Ok(());
    }

    let mut session = ChatSession::new();
    tracing::info!(
        thread_id = %session.thread_id(),
        endpoint = ?client.endpoint(),
        "Session started"
    );

    match args.query {
        Some(query) => run_query(&driver, &mut session, &query).await,
        None => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                print!("> ");
                std::io::stdout().flush()?;
                let Some(line) = lines.next_line().await? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                run_query(&driver, &mut session, &line).await;
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    }

    Ok(())
}

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("localmind {}", VERSION);
        std::process::exit(0);
    }
    if std::env::args().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", USAGE);
        std::process::exit(0);
    }

    color_eyre::install()?;
    init_tracing();

    let args = parse_args()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(args))
}
