use std::collections::HashSet;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tourbot::{
    api,
    event::RoomEventHandler,
    BotConfig, ChannelTransport, EventBus, JsonFileRankingRepository, ProtocolReader,
    RankingService, RoomSubscription, StaticTeamProvider, TournamentContext, TournamentManager,
    TournamentRoomSubscriber,
};
use tourbot::shared::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourbot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = BotConfig::from_env()?;
    info!(
        bot_name = %config.bot_name,
        rankings_path = %config.rankings_path.display(),
        join_tours = config.join_tours,
        "Starting tournament bot"
    );

    let repository = Arc::new(JsonFileRankingRepository::new(&config.rankings_path));
    let rankings = Arc::new(RankingService::new(repository));

    let teams = match &config.teams_path {
        Some(path) => StaticTeamProvider::from_file(path)?,
        None => StaticTeamProvider::new(),
    };

    // Protocol lines for the server go to stdout, one per line
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = outbound_rx.recv().await {
            let written = async {
                stdout.write_all(line.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await
            };
            if let Err(e) = written.await {
                error!(error = %e, "Failed to write outbound line");
                break;
            }
        }
    });
    let transport = Arc::new(ChannelTransport::new(outbound_tx));

    let context = TournamentContext::new(rankings.clone(), Arc::new(teams), transport)
        .with_replay_base_url(config.replay_base_url.clone());
    let manager = Arc::new(
        TournamentManager::new(context, &config.bot_name).with_join_tours(config.join_tours),
    );

    let app = api::router(AppState::new(rankings, manager.clone()))
        .layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(config.http_bind).await?;
    info!(bind = %config.http_bind, "Query server listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Query server stopped");
        }
    });

    let event_bus = EventBus::new();
    let subscriber: Arc<dyn RoomEventHandler> = Arc::new(TournamentRoomSubscriber::new(manager));
    let mut subscribed_rooms = HashSet::new();

    // One socket message per chunk: a `>room` header or a blank line closes
    // the previous chunk, which ends any join backlog it carried.
    let mut reader = ProtocolReader::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some((room_id, decoded)) = reader.feed(&line) else {
            continue;
        };

        match decoded {
            Ok(message) => {
                if subscribed_rooms.insert(room_id.clone()) {
                    RoomSubscription::new(room_id.clone(), subscriber.clone(), event_bus.clone())
                        .start()
                        .await;
                }
                event_bus.emit_to_room(&room_id, message).await;
            }
            Err(e) => {
                warn!(room_id = %room_id, error = %e, "Dropping undecodable protocol line");
            }
        }
    }

    info!("Protocol input closed, shutting down");
    Ok(())
}
