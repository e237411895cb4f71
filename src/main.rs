//! Storefront Bot - Telegram storefront with an admin REST API

use anyhow::Result;
use storefront_bot::{api, bot, db, AppState, Config, EventPublisher};
use teloxide::Bot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await?;
    if config.seed_sample_data && db::seed::sample_data(&pool).await? {
        tracing::info!("sample catalog created");
    }
    if config.admin_ids.is_empty() {
        tracing::warn!("ADMIN_IDS is empty; new orders will not reach anyone");
    }

    let events = EventPublisher::connect(config.nats_url.as_deref()).await;
    let token = config.bot_token.clone();
    let port = config.port;
    let state = AppState::new(pool, config, events);

    let telegram = {
        let state = state.clone();
        async move {
            match token {
                Some(token) => bot::run(Bot::new(token), state).await,
                None => {
                    tracing::warn!("BOT_TOKEN not set, running the HTTP API only");
                    std::future::pending().await
                }
            }
        }
    };

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("🚀 Storefront Bot listening on 0.0.0.0:{}", port);
    let http = axum::serve(listener, api::router(state)).with_graceful_shutdown(shutdown_signal());

    tokio::select! {
        res = http => res?,
        res = telegram => res?,
    }
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
