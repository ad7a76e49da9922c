use std::sync::Arc;

use watchlist_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, run_migrations, PgRepository},
    services::Recommender,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    run_migrations(&pool).await?;

    let state = AppState::new(
        Arc::new(PgRepository::new(pool)),
        Recommender::new(config.cluster_params()),
        config.default_recommendations,
    );

    // Create the router with all routes
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, clusters = config.num_clusters, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
