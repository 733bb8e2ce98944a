mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use wftrack_collect::{PipelineOptions, SourceSet};

use crate::{
    api::{build_app, default_collect_rate_limit, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = wftrack_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(config = ?config, "starting wftrack server");

    let pool_config = wftrack_db::PoolConfig::from_app_config(&config);
    let pool = wftrack_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = wftrack_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let state = AppState {
        pool: pool.clone(),
        sources: Arc::new(SourceSet::from_config(&config)?),
        pipeline: PipelineOptions {
            platform_delay: Duration::from_secs(config.platform_delay_secs),
        },
    };

    let mut scheduler = scheduler::build_scheduler(state.clone(), &config).await?;
    if config.collect_on_startup {
        scheduler::spawn_startup_run(state.clone(), &config.countries);
    }

    let auth = AuthState::from_keys(
        &config.api_keys,
        matches!(config.env, wftrack_core::Environment::Development),
    );
    let app = build_app(state, auth, default_collect_rate_limit());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await?;
    pool.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
