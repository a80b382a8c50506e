use std::sync::Arc;

use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todolist::clock::{Clock, SystemClock};
use todolist::config::AppConfig;
use todolist::db::{self, preferences};
use todolist::notifications::SqliteScheduler;
use todolist::services::{ReminderDispatcher, ReminderPolicy};
use todolist::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "todolist=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    let pool = db::connect(&config.database_url).await?;

    let theme = preferences::load_theme(&pool).await?;
    info!("theme: {}", theme.as_str());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = Arc::new(SqliteScheduler::new(pool.clone()));

    let mut state = AppState::new(
        scheduler.clone(),
        clock.clone(),
        ReminderPolicy::new(config.reminder_time),
    );
    state.connect(pool);
    state.start().await?;

    for group in state.board() {
        info!("{} ({} todos)", group.heading(), group.todos.len());
        for todo in &group.todos {
            info!("  #{} [{}] {}", todo.id, todo.status, todo.name);
        }
    }
    debug!("board: {}", serde_json::to_string(&state.board())?);

    let dispatcher = ReminderDispatcher::new(scheduler, clock, config.dispatch_interval_secs);
    let dispatcher_task = tokio::spawn(dispatcher.start());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    dispatcher_task.abort();

    Ok(())
}
