//! Update inspector.
//!
//! Reads one update (or a `getUpdates` response) as JSON from the file
//! given as the first argument, or from stdin, and prints how it
//! classifies. Resolution options come from the environment (a `.env`
//! file is loaded first), logging from `RUST_LOG`.

use std::io::Read;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use telegram_objects::types::*;
use telegram_objects::{Update, UpdateEvent};

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "failed to inspect update");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).inspect_err(|e| {
            error!(path = %path, error = %e, "failed to read input file");
        })?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let options = ResolveOptions::from_env();
    info!(shape = ?options.shape, calls = ?options.calls, "resolving with options");

    let updates = ApiResponse::from_json(&text)?.updates(options)?;
    if updates.is_empty() {
        warn!("response contained no updates");
    }

    for update in &updates {
        print_update(update);
    }
    Ok(())
}

fn print_update(update: &Update) {
    let id = update
        .update_id()
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let kind = update
        .classify()
        .map_or_else(|| "none".to_string(), ToString::to_string);

    println!("update {id}: {kind}");

    let message = update.message();
    if let Some(message_type) = message.message_type() {
        println!("  message type: {message_type}");
    }
    if let Some(chat_id) = update.chat().i64("id") {
        println!("  chat: {chat_id}");
    }
    if update.has_command() {
        if let Some(command) = message.command() {
            println!("  command: /{} {}", command.name, command.args);
        }
    }

    match UpdateEvent::from_update(update) {
        UpdateEvent::Unknown { kind, .. } => {
            warn!(kind = ?kind, "no typed event for update");
        }
        event => {
            if let Some(object) = event.object() {
                let fields: Vec<&str> = object.keys().collect();
                println!("  {:?} fields: {}", object.kind(), fields.join(", "));
            }
        }
    }
}
