use tomotrip_server::config::AppConfig;
use tomotrip_server::init_logging;
use tomotrip_server::store::migrations;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::load()?;
    let database_url = config.database_url()?;
    let max_connections = config.database.max_connections.unwrap_or(5);

    log::info!("Connecting to PostgreSQL...");
    let pool = migrations::connect(&database_url, max_connections).await?;

    log::info!("Applying schema ({} tables)...", migrations::SCHEMA_STATEMENTS.len());
    migrations::run(&pool).await?;
    log::info!("Migration complete");

    pool.close().await;
    Ok(())
}
