//! Presence relay server.
//!
//! Tracks the participants of one session and relays their join/update/leave
//! events to every other connected client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin relay-server
//! cargo run --bin relay-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use relay_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemorySessionRepository},
    ui::{Server, ServerConfig},
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, EventSequencer,
        GetParticipantsUseCase, GetSessionStateUseCase, RelayEventUseCase,
    },
};
use relay_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(about = "Presence relay server for multiplayer sessions", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Timeout for writing one frame to a client, in milliseconds
    #[arg(long, default_value = "5000")]
    send_timeout_ms: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases (sharing one sequencer)
    // 4. Server

    // 1. Create Repository (in-memory session registry)
    let repository = Arc::new(InMemorySessionRepository::default());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::default());

    // 3. Create UseCases
    let sequencer = Arc::new(EventSequencer::new());
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        sequencer.clone(),
    ));
    let relay_event_usecase = Arc::new(RelayEventUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        sequencer.clone(),
        Arc::new(SystemClock),
    ));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        sequencer,
    ));
    let get_participants_usecase = Arc::new(GetParticipantsUseCase::new(repository.clone()));
    let get_session_state_usecase = Arc::new(GetSessionStateUseCase::new(
        repository,
        message_pusher,
    ));

    // 4. Create and run the server
    let server = Server::new(
        connect_participant_usecase,
        relay_event_usecase,
        disconnect_participant_usecase,
        get_participants_usecase,
        get_session_state_usecase,
        ServerConfig {
            send_timeout: Duration::from_millis(args.send_timeout_ms),
        },
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
