//! UKM backend server binary

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ukm_backend::{
    config::Args,
    db::{seed::seed_admin, Collections, MongoClient},
    server, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ukm_backend={},info", args.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  UKM Backend v{}", env!("CARGO_PKG_VERSION"));
    info!("======================================");
    info!("Listen: {}", args.listen_addr());
    info!("MongoDB database: {}", args.mongodb_db);
    info!("Request timeout: {} ms", args.request_timeout_ms);
    info!("Seed admin: {}", args.seed_admin);
    info!("======================================");

    let state = AppState::new(args.clone())?;

    let state = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(mongo) => {
            let collections = Collections::open(&mongo).await?;

            if args.seed_admin {
                if let Err(e) = seed_admin(&collections.users, &args).await {
                    warn!("Admin seeding failed: {}", e);
                }
            }

            state.with_database(collections)
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    server::run(Arc::new(state)).await?;

    Ok(())
}
