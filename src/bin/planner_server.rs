//! HTTP server for contribution settings and projections
//!
//! Configured through environment variables, see `contribution_planner::config`.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use contribution_planner::{
    api::{self, AppState},
    config::ServerConfig,
    policy::load_policies,
    ContributionPolicy, InMemoryPolicyStore, PolicyDefaults, PolicyStore,
};
use log::info;

fn build_store(config: &ServerConfig) -> anyhow::Result<InMemoryPolicyStore> {
    let defaults = PolicyDefaults::STANDARD;

    if let Some(path) = &config.seed_csv {
        let records = load_policies(path, &defaults)
            .with_context(|| format!("loading seed records from {}", path.display()))?;
        info!("Loaded {} seed records from {}", records.len(), path.display());
        return Ok(InMemoryPolicyStore::with_records(defaults, records));
    }

    if config.seed_demo {
        info!("Seeding demo record for {}", config.default_user_id);
        let demo = ContributionPolicy::demo(&config.default_user_id, Utc::now());
        return Ok(InMemoryPolicyStore::with_records(defaults, [demo]));
    }

    Ok(InMemoryPolicyStore::new(defaults))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter.as_str()))
        .init();

    let store = build_store(&config)?;
    info!("Store ready with {} records", store.len()?);

    let state = AppState::new(Arc::new(store), &config.default_user_id);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!("401(k) planner API listening on http://{}", config.bind);
    info!("Health check: http://{}/api/health", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
