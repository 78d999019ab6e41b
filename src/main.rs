#![allow(clippy::result_large_err)]

use bill_splitter::{
    config::{
        app::{AppConfig, load_default_config},
        database::{create_connection, create_tables, get_database_url},
    },
    core::{
        aggregate::BalanceScope,
        report::{format_balances, format_split_summary},
        slug::{path_segment, share_path},
        storage::{load_session, save_session},
    },
    errors::{Error, Result},
};
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: bill-splitter [report [PATH] | import FILE | export FILE]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file
    dotenv().ok(); // Make it non-fatal, env vars can be set externally

    // 3. Load the application configuration
    let app_config = load_default_config()
        .inspect_err(|e| error!("Failed to load application configuration: {}", e))?;

    // 4. Open storage
    let database_url = get_database_url();
    let db = create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Dispatch
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("report") => report(&db, &app_config, args.get(1).map(String::as_str)).await,
        Some("import") => import(&db, &app_config, required(&args, 1)?).await,
        Some("export") => export(&db, &app_config, required(&args, 1)?).await,
        Some(other) => Err(Error::Usage {
            message: format!("Unknown command `{other}`. {USAGE}"),
        }),
    }
}

fn required(args: &[String], idx: usize) -> Result<&str> {
    args.get(idx).map(String::as_str).ok_or_else(|| Error::Usage {
        message: USAGE.to_string(),
    })
}

async fn report(db: &DatabaseConnection, config: &AppConfig, path: Option<&str>) -> Result<()> {
    let segment = path.and_then(|p| path_segment(p, &config.base_path));
    let session = load_session(db, &config.storage, segment).await?;

    if let Some(split) = session.collection.selected()
        && let Some(allocation) = session.selected_allocation(&config.palette)
    {
        info!("Selected split: {}", share_path(&config.base_path, split));
        info!("\n{}", format_split_summary(split, &allocation));
    } else {
        info!("No splits saved yet.");
    }

    let view = session.balances(BalanceScope::All);
    info!("Balances across {} split(s):\n{}", session.collection.len(), format_balances(&view));
    Ok(())
}

async fn import(db: &DatabaseConnection, config: &AppConfig, file: &str) -> Result<()> {
    let text = std::fs::read_to_string(file)?;
    let mut session = load_session(db, &config.storage, None).await?;

    let outcome = session.import_json(&text)?;
    save_session(db, &config.storage, &session).await?;

    info!(
        splits = ?outcome.splits,
        settlements = outcome.settlements,
        "Imported {}",
        file
    );
    Ok(())
}

async fn export(db: &DatabaseConnection, config: &AppConfig, file: &str) -> Result<()> {
    let session = load_session(db, &config.storage, None).await?;
    std::fs::write(file, session.export_json()?)?;
    info!("Exported {} split(s) to {}", session.collection.len(), file);
    Ok(())
}
