use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    // Load .env if it exists
    dotenvy::dotenv().ok();

    println!("Starting database migration...");

    let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "data/givetrack.db".to_string());
    if let Some(parent) = Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let migration_path =
        env::var("MIGRATION_FILE").unwrap_or_else(|_| "migrations/init.sql".to_string());

    if !Path::new(&migration_path).exists() {
        println!("Migration file not found at: {}", migration_path);
        return Ok(());
    }

    let sql_content = fs::read_to_string(&migration_path)?;

    println!("Opening database at {}", db_path);
    let conn = Connection::open(&db_path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // Schema statements are all `IF NOT EXISTS`, so re-running is safe.
    conn.execute_batch(&sql_content)
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    println!("Migration complete.");
    Ok(())
}
