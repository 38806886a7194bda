// Copyright 2023 Remi Bernotavicius

use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;

pub mod models;
pub mod query;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

type MigrationError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("couldn't open database: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error(transparent)]
    Query(#[from] diesel::result::Error),
    #[error("migration failed: {0}")]
    Migration(MigrationError),
    #[error("database path {0:?} is not valid UTF-8")]
    InvalidPath(std::path::PathBuf),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("login id {0:?} is already registered")]
    LoginIdTaken(String),
    #[error("ingredient {name:?} is used by {recipes} recipe(s) and can't be deleted")]
    IngredientInUse { name: String, recipes: i64 },
}

pub type Result<T> = std::result::Result<T, Error>;

fn open(url: &str) -> Result<Connection> {
    let mut connection = Connection::establish(url)?;
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;
    Ok(connection)
}

/// Opens (creating if needed) the database at `path` and brings the schema up to date.
pub fn establish_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let url = path
        .to_str()
        .ok_or_else(|| Error::InvalidPath(path.to_owned()))?;
    let mut connection = open(url)?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(Error::Migration)?;
    for version in applied {
        log::info!("applied migration {version}");
    }
    Ok(connection)
}

/// Versions of every applied migration, oldest first.
pub fn applied_migrations(conn: &mut Connection) -> Result<Vec<String>> {
    let mut versions: Vec<String> = conn
        .applied_migrations()
        .map_err(Error::Migration)?
        .into_iter()
        .map(|v| v.to_string())
        .collect();
    versions.sort();
    Ok(versions)
}

/// Reverts the newest applied migration and returns its version.
pub fn revert_last_migration(conn: &mut Connection) -> Result<String> {
    let version = conn
        .revert_last_migration(MIGRATIONS)
        .map_err(Error::Migration)?;
    log::info!("reverted migration {version}");
    Ok(version.to_string())
}

#[cfg(test)]
pub fn test_connection() -> Connection {
    let mut conn = open(":memory:").unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
    conn
}

#[test]
fn migrations() {
    let mut conn = open(":memory:").unwrap();

    conn.run_pending_migrations(MIGRATIONS).unwrap();
    assert_eq!(applied_migrations(&mut conn).unwrap().len(), 8);

    conn.revert_all_migrations(MIGRATIONS).unwrap();
    assert!(applied_migrations(&mut conn).unwrap().is_empty());

    conn.run_pending_migrations(MIGRATIONS).unwrap();
    assert_eq!(applied_migrations(&mut conn).unwrap().len(), 8);
}

#[test]
fn labor_and_utility_become_custom_cost_items() {
    use diesel::sql_types::{Double, Integer, Text};

    #[derive(diesel::QueryableByName, Debug, PartialEq)]
    struct Item {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Double)]
        amount: f64,
        #[diesel(sql_type = Integer)]
        display_order: i32,
    }

    let mut conn = open(":memory:").unwrap();
    for _ in 0..7 {
        conn.run_next_migration(MIGRATIONS).unwrap();
    }

    diesel::sql_query("INSERT INTO stores (login_id, store_name) VALUES ('shop', 'Shop')")
        .execute(&mut conn)
        .unwrap();
    diesel::sql_query(
        "INSERT INTO cost_settings \
            (store_id, include_labor_cost, include_utility_cost, hourly_wage, \
             monthly_utility_cost, profit_margin) \
        VALUES (1, 1, 0, 1200, 43200, 30)",
    )
    .execute(&mut conn)
    .unwrap();

    conn.run_pending_migrations(MIGRATIONS).unwrap();

    let items: Vec<Item> = diesel::sql_query(
        "SELECT name, amount, display_order FROM custom_cost_items ORDER BY display_order",
    )
    .load(&mut conn)
    .unwrap();
    assert_eq!(
        items,
        vec![
            Item {
                name: crate::cost::LABOR_COST_NAME.into(),
                amount: 20.0,
                display_order: 1
            },
            Item {
                name: crate::cost::UTILITY_COST_NAME.into(),
                amount: 1.0,
                display_order: 2
            },
        ]
    );

    conn.revert_last_migration(MIGRATIONS).unwrap();
    let remaining: Vec<Item> = diesel::sql_query(
        "SELECT name, amount, display_order FROM custom_cost_items ORDER BY display_order",
    )
    .load(&mut conn)
    .unwrap();
    assert!(remaining.is_empty());
}
