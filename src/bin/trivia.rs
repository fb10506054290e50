use anyhow::Context;
use clap::Parser;
use trivia_api::configuration::get_configuration;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::app::run_server;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file, extension optional
    #[clap(long, default_value = "configuration")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let settings = get_configuration(&cli.config).context("Failed to read configuration")?;

    let pool = establish_connection(&settings.database)
        .await
        .context("Cannot connect to DB")?;
    if settings.database.run_migrations {
        tracing::info!("Running db migrations...");
        run_migrations(&pool).await?;
    }

    run_server(pool, &settings.application.address()).await
}
