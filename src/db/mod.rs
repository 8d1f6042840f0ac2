use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::env;
use std::path::Path;
use std::str::FromStr;

pub mod models;

use chrono::{DateTime, Utc};
use models::{
    Donation, DonationCategory, DonationStatus, DonationType, DonationWithNgo, HumanSubcategory,
    NewDonation, Ngo, User,
};

pub type DbPool = Pool<SqliteConnectionManager>;

const SCHEMA: &str = include_str!("../../migrations/init.sql");

pub async fn init_pool() -> anyhow::Result<DbPool> {
    let path = env::var("DATABASE_PATH").unwrap_or_else(|_| "data/givetrack.db".to_string());
    init_pool_at(&path).await
}

/// Open a pool against an explicit database path. Integration tests point
/// this at a temp file so parallel tests never share a database.
pub async fn init_pool_at(path: &str) -> anyhow::Result<DbPool> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
    });
    let pool = Pool::builder()
        .max_size(10)
        .connection_timeout(std::time::Duration::from_secs(60))
        .build(manager)
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))?;

    // Schema is idempotent (CREATE ... IF NOT EXISTS), applied on every boot.
    let conn = pool.get()?;
    conn.execute_batch(SCHEMA)?;

    Ok(pool)
}

async fn with_conn<T, F>(pool: &DbPool, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool.get()?;
        f(&conn)
    })
    .await?
}

fn donation_from_row(row: &Row<'_>) -> rusqlite::Result<Donation> {
    let status: String = row.get(3)?;
    let category: String = row.get(4)?;
    let subcategory: Option<String> = row.get(5)?;
    let donation_type: String = row.get(6)?;

    Ok(Donation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        transaction_id: row.get(2)?,
        status: DonationStatus::from_str(&status)
            .map_err(|e| rusqlite::Error::InvalidColumnName(e))?,
        category: DonationCategory::from_str(&category)
            .map_err(|e| rusqlite::Error::InvalidColumnName(e))?,
        subcategory: subcategory
            .map(|s| HumanSubcategory::from_str(&s))
            .transpose()
            .map_err(|e| rusqlite::Error::InvalidColumnName(e))?,
        donation_type: DonationType::from_str(&donation_type)
            .map_err(|e| rusqlite::Error::InvalidColumnName(e))?,
        amount: row.get(7)?,
        donation_mode: row.get(8)?,
        delivery_address: row.get(9)?,
        other_details: row.get(10)?,
        ngo_id: row.get(11)?,
        impact_report: row.get(12)?,
        created_at: row.get(13)?,
    })
}

const DONATION_COLUMNS: &str = "d.id, d.user_id, d.transaction_id, d.status, d.category, \
    d.subcategory, d.donation_type, d.amount, d.donation_mode, d.delivery_address, \
    d.other_details, d.ngo_id, d.impact_report, d.created_at";

const NGO_COLUMNS: &str = "n.id, n.name, n.wallet_address, n.category, n.description, \
    n.is_verified, n.impact_reports, n.created_at";

fn donation_with_ngo_from_row(row: &Row<'_>) -> rusqlite::Result<DonationWithNgo> {
    let donation = donation_from_row(row)?;
    // LEFT JOIN: the NGO columns are all NULL when no relation resolved.
    let ngo_id: Option<String> = row.get(14)?;
    let ngo = match ngo_id {
        Some(id) => Some(Ngo {
            id,
            name: row.get(15)?,
            wallet_address: row.get(16)?,
            category: row.get(17)?,
            description: row.get(18)?,
            is_verified: row.get(19)?,
            impact_reports: row.get(20)?,
            created_at: row.get(21)?,
        }),
        None => None,
    };
    Ok(DonationWithNgo { donation, ngo })
}

/// One atomic insert, returning the persisted row (server-read `id` and
/// `created_at`) exactly as stored.
pub async fn insert_donation(pool: &DbPool, new: NewDonation) -> anyhow::Result<Donation> {
    with_conn(pool, move |conn| {
        conn.execute(
            "INSERT INTO donations (id, user_id, transaction_id, status, category, subcategory, \
             donation_type, amount, donation_mode, delivery_address, other_details, ngo_id, \
             impact_report, created_at) \
             VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL, ?12)",
            params![
                new.id,
                new.user_id,
                new.transaction_id,
                new.category.as_str(),
                new.subcategory.map(|s| s.as_str()),
                new.donation_type.as_str(),
                new.amount,
                new.donation_mode,
                new.delivery_address,
                new.other_details,
                new.ngo_id,
                new.created_at,
            ],
        )?;

        let donation = conn.query_row(
            &format!(
                "SELECT {} FROM donations d WHERE d.id = ?1",
                DONATION_COLUMNS
            ),
            params![new.id],
            donation_from_row,
        )?;
        Ok(donation)
    })
    .await
}

/// Exact-match lookup by transaction identifier, joined to the NGO relation.
pub async fn find_donation_by_transaction_id(
    pool: &DbPool,
    transaction_id: &str,
) -> anyhow::Result<Option<DonationWithNgo>> {
    let transaction_id = transaction_id.to_string();
    with_conn(pool, move |conn| {
        let result = conn
            .query_row(
                &format!(
                    "SELECT {}, {} FROM donations d \
                     LEFT JOIN ngos n ON n.id = d.ngo_id \
                     WHERE d.transaction_id = ?1",
                    DONATION_COLUMNS, NGO_COLUMNS
                ),
                params![transaction_id],
                donation_with_ngo_from_row,
            )
            .optional()?;
        Ok(result)
    })
    .await
}

/// The authenticated owner's donations, newest first.
pub async fn list_donations_for_user(
    pool: &DbPool,
    user_id: &str,
) -> anyhow::Result<Vec<DonationWithNgo>> {
    let user_id = user_id.to_string();
    with_conn(pool, move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, {} FROM donations d \
             LEFT JOIN ngos n ON n.id = d.ngo_id \
             WHERE d.user_id = ?1 \
             ORDER BY d.created_at DESC",
            DONATION_COLUMNS, NGO_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id], donation_with_ngo_from_row)?;
        let mut donations = Vec::new();
        for row in rows {
            donations.push(row?);
        }
        Ok(donations)
    })
    .await
}

fn ngo_from_row(row: &Row<'_>) -> rusqlite::Result<Ngo> {
    Ok(Ngo {
        id: row.get(0)?,
        name: row.get(1)?,
        wallet_address: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        is_verified: row.get(5)?,
        impact_reports: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub async fn list_ngos(pool: &DbPool) -> anyhow::Result<Vec<Ngo>> {
    with_conn(pool, |conn| {
        let mut stmt = conn.prepare(
            "SELECT id, name, wallet_address, category, description, is_verified, \
             impact_reports, created_at FROM ngos ORDER BY name",
        )?;
        let rows = stmt.query_map([], ngo_from_row)?;
        let mut ngos = Vec::new();
        for row in rows {
            ngos.push(row?);
        }
        Ok(ngos)
    })
    .await
}

pub async fn upsert_ngo(
    pool: &DbPool,
    id: &str,
    name: &str,
    wallet_address: &str,
    category: &Option<String>,
    description: &Option<String>,
    is_verified: bool,
    impact_reports: i64,
    now: DateTime<Utc>,
) -> anyhow::Result<Ngo> {
    let id = id.to_string();
    let name = name.to_string();
    let wallet_address = wallet_address.to_string();
    let category = category.clone();
    let description = description.clone();
    with_conn(pool, move |conn| {
        conn.execute(
            "INSERT INTO ngos (id, name, wallet_address, category, description, is_verified, \
             impact_reports, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             ON CONFLICT(id) DO UPDATE SET \
             name = excluded.name, wallet_address = excluded.wallet_address, \
             category = excluded.category, description = excluded.description, \
             is_verified = excluded.is_verified, impact_reports = excluded.impact_reports",
            params![
                id,
                name,
                wallet_address,
                category,
                description,
                is_verified,
                impact_reports,
                now,
            ],
        )?;

        let ngo = conn.query_row(
            "SELECT id, name, wallet_address, category, description, is_verified, \
             impact_reports, created_at FROM ngos WHERE id = ?1",
            params![id],
            ngo_from_row,
        )?;
        Ok(ngo)
    })
    .await
}

pub async fn create_user(
    pool: &DbPool,
    id: &str,
    email: &str,
    password_hash: &str,
    name: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let id = id.to_string();
    let email = email.to_string();
    let password_hash = password_hash.to_string();
    let name = name.to_string();
    with_conn(pool, move |conn| {
        conn.execute(
            "INSERT INTO users (id, email, password_hash, name, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, email, password_hash, name, now],
        )?;
        Ok(())
    })
    .await
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub async fn find_user_by_email(pool: &DbPool, email: &str) -> anyhow::Result<Option<User>> {
    let email = email.to_string();
    with_conn(pool, move |conn| {
        let user = conn
            .query_row(
                "SELECT id, email, password_hash, name, created_at FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    })
    .await
}
