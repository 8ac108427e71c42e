use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{anyhow, Result};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use glimpse::{
    config::AssistantConfig,
    db::Database,
    events::{self, AssistantEvent},
    ollama::{CompletionOutcome, OllamaClient},
    pipeline::{QueryPipeline, GATEWAY_ERROR_TEXT},
};

struct CliArgs {
    config_path: PathBuf,
    /// Remaining arguments joined into a single one-shot query.
    one_shot_query: Option<String>,
}

fn parse_args() -> Result<CliArgs> {
    let mut config_path = PathBuf::from("glimpse.json");
    let mut query_parts = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = PathBuf::from(
                    args.next()
                        .ok_or_else(|| anyhow!("--config requires a path"))?,
                );
            }
            _ => query_parts.push(arg),
        }
    }

    let one_shot_query = if query_parts.is_empty() {
        None
    } else {
        Some(query_parts.join(" "))
    };

    Ok(CliArgs {
        config_path,
        one_shot_query,
    })
}

fn init_logging(config: &AssistantConfig) {
    // RUST_LOG wins over the configured fallback filter.
    env_logger::Builder::new()
        .parse_filters(&config.log_level)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = Arc::new(AssistantConfig::load(&args.config_path)?);
    init_logging(&config);

    info!("glimpse starting up");

    let db = Database::open(config.database_path.clone())?;
    let gateway = OllamaClient::new(&config)?;
    let (event_tx, mut event_rx) = events::channel();
    let pipeline = QueryPipeline::new(db, gateway, config.clone(), event_tx);

    if let Some(query) = args.one_shot_query {
        return run_one_shot(&pipeline, &query).await;
    }

    // Render task: the single consumer of presentation events, and the only
    // owner of display state. Chunks append, a complete event replaces.
    let model_name = config.model_name.clone();
    let render = tokio::spawn(async move {
        let mut reply = String::new();
        while let Some(event) = event_rx.recv().await {
            match event {
                AssistantEvent::ReplyChunk(part) => {
                    reply.push_str(&part);
                    print!("{part}");
                    let _ = io::stdout().flush();
                }
                AssistantEvent::ReplyComplete(full) => {
                    if reply.is_empty() {
                        println!("{full}");
                    } else if full == reply {
                        println!();
                    } else {
                        println!();
                        println!("{full}");
                    }
                    reply.clear();
                }
                AssistantEvent::ContextSelected {
                    time_range,
                    word_count,
                } => {
                    println!(
                        "{model_name} -- context from {time_range} -- context length {word_count} words"
                    );
                }
                AssistantEvent::Hide => {
                    reply.clear();
                }
            }
        }
    });

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("SIGINT received, exiting");
                shutdown.cancel();
            }
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => match line? {
                Some(line) => pipeline.submit(&line),
                None => break,
            },
        }
    }

    render.abort();
    Ok(())
}

async fn run_one_shot(pipeline: &QueryPipeline, query: &str) -> Result<()> {
    match pipeline.one_shot(query).await? {
        CompletionOutcome::Reply(reply) => println!("{reply}"),
        CompletionOutcome::Empty => println!("(no answer available)"),
        CompletionOutcome::Failed => println!("{GATEWAY_ERROR_TEXT}"),
    }
    Ok(())
}
