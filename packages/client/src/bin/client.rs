//! Interactive presence relay client.
//!
//! Joins the session, prints peer events, and publishes each typed JSON object
//! as our new state. `/quit`, Ctrl+C or Ctrl+D leave the session.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin relay-client -- --id p1 --username alice --state '{"x":0}'
//! ```

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use relay_client::{ClientError, PeerEventHandler, PresenceClient, formatter::MessageFormatter};
use relay_shared::logger::setup_logger;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "relay-client")]
#[command(about = "Presence relay client publishing JSON state from the prompt", long_about = None)]
struct Args {
    /// Relay WebSocket URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Participant id announced in the join
    #[arg(short = 'i', long)]
    id: String,

    /// Display name announced in the join
    #[arg(short = 'n', long)]
    username: String,

    /// Initial state as JSON
    #[arg(short = 's', long, default_value = "{}")]
    state: String,
}

/// Prints peer events above the prompt.
struct ConsoleHandler {
    own_id: String,
}

impl ConsoleHandler {
    fn redisplay_prompt(&self) {
        print!("{}> ", self.own_id);
        std::io::stdout().flush().ok();
    }
}

impl PeerEventHandler for ConsoleHandler {
    fn on_peer_join(&self, id: &str, username: &str, state: &Value) {
        print!(
            "{}",
            MessageFormatter::format_peer_joined(id, username, state, &self.own_id)
        );
        self.redisplay_prompt();
    }

    fn on_peer_update(&self, id: &str, state: &Value) {
        print!("{}", MessageFormatter::format_peer_updated(id, state));
        self.redisplay_prompt();
    }

    fn on_peer_leave(&self, id: &str) {
        print!("{}", MessageFormatter::format_peer_left(id));
        self.redisplay_prompt();
    }

    fn on_connect(&self) {
        println!(
            "\nYou are '{}'. Type a JSON state and press Enter to publish it. Type /quit to leave.\n",
            self.own_id
        );
    }

    fn on_disconnect(&self) {
        tracing::info!("Disconnected from relay");
    }

    fn on_error(&self, error: &ClientError) {
        tracing::warn!("Relay connection error: {}", error);
    }
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let initial_state: Value = serde_json::from_str(&args.state)?;
    let handler = Arc::new(ConsoleHandler {
        own_id: args.id.clone(),
    });

    let client =
        PresenceClient::connect(&args.url, &args.id, &args.username, initial_state, handler)
            .await?;

    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // rustyline is synchronous, so it gets its own thread
    let prompt = format!("{}> ", args.id);
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    while let Some(line) = input_rx.recv().await {
        if line == "/quit" {
            break;
        }

        let state: Value = match serde_json::from_str(&line) {
            Ok(state) => state,
            Err(e) => {
                print!("{}", MessageFormatter::format_invalid_input(&e.to_string()));
                continue;
            }
        };

        let confirmation = MessageFormatter::format_sent_confirmation(&state);
        match client.send_state(state) {
            Ok(()) => print!("{}", confirmation),
            Err(ClientError::InvalidState(got)) => {
                let reason = format!("expected an object, got {}", got);
                print!("{}", MessageFormatter::format_invalid_input(&reason));
            }
            Err(e) => return Err(e.into()),
        }
    }

    client.disconnect().await?;
    Ok(())
}
