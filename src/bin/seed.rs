//! Creates the schema and loads the sample catalogue in one transaction.

use watchlist_api::{
    config::Config,
    db::{create_pool, run_migrations, seed, PgRepository},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;
    let pool = create_pool(&config.database_url, 1).await?;
    run_migrations(&pool).await?;

    let tx = PgRepository::new(pool).begin().await?;
    match seed::seed(&tx).await {
        Ok(summary) => {
            tx.commit().await?;
            tracing::info!(
                users = summary.users,
                content = summary.content,
                watches = summary.watches,
                "Database initialized with sample data"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Error initializing database, rolling back");
            tx.rollback().await?;
        }
    }

    Ok(())
}
