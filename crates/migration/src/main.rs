use config::{Config, Environment, File};
use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_SQLITE: &str = "fintrack.db";

/// `DATABASE_URL` wins; otherwise the sqlite file the app itself is
/// configured with (`settings.toml` / `FINTRACK__SERVER__DATABASE__SQLITE`).
fn database_url() -> Result<String, config::ConfigError> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(url);
    }
    let settings = Config::builder()
        .add_source(File::with_name("settings").required(false))
        .add_source(Environment::with_prefix("FINTRACK").separator("__"))
        .build()?;
    Ok(sqlite_url(&settings))
}

fn sqlite_url(settings: &Config) -> String {
    let path = settings
        .get_string("server.database.sqlite")
        .unwrap_or_else(|_| DEFAULT_SQLITE.to_string());
    format!("sqlite:{path}?mode=rwc")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cmd = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    let db_url = database_url()?;
    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, Some(1)).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        _ => {
            eprintln!("usage: migration [up|down|fresh|status]");
            std::process::exit(2);
        }
    }

    Ok(())
}
