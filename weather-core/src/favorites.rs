//! SQLite-backed storage of favorite cities.
//!
//! Names are normalized before they reach the database and the table carries a
//! `UNIQUE` constraint, so a duplicate is detected by the insert itself.

use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::path::Path;
use thiserror::Error;

use crate::model::FavoriteCity;

/// Errors that can occur during favorites operations.
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// The name was empty after trimming.
    #[error("City name is required.")]
    Empty,

    /// A city with the same normalized name is already saved.
    #[error("{0} is already saved")]
    Conflict(String),

    /// No favorite with this id.
    #[error("Favorite not found: {0}")]
    NotFound(i64),

    /// Database error.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Result type for favorites operations.
pub type FavoritesResult<T> = Result<T, FavoritesError>;

/// Trim `raw` and title-case every word.
///
/// A letter is upper-cased when it follows a non-letter (or starts the
/// string) and lower-cased otherwise, so "new york" becomes "New York" and
/// "o'neil" becomes "O'Neil". Returns `None` when nothing is left.
pub fn normalize_city_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut prev_is_letter = false;
    for c in trimmed.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    Some(out)
}

/// Favorite cities persisted in a single SQLite table.
pub struct FavoritesStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore").finish_non_exhaustive()
    }
}

impl FavoritesStore {
    /// Open the store at `path`, creating the file and table if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> FavoritesResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> FavoritesResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> FavoritesResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS favorite_city (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city_name TEXT NOT NULL UNIQUE COLLATE NOCASE
            );
            "#,
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Save `city_name` after normalizing it.
    ///
    /// # Errors
    /// `Empty` for a blank name, `Conflict` if the normalized name exists.
    pub fn add(&self, city_name: &str) -> FavoritesResult<FavoriteCity> {
        let city_name = normalize_city_name(city_name).ok_or(FavoritesError::Empty)?;

        let conn = self.conn.lock();
        let inserted = conn.execute("INSERT INTO favorite_city (city_name) VALUES (?1)", params![city_name]);
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(FavoritesError::Conflict(city_name)),
            Err(e) => return Err(e.into()),
        }

        let favorite = FavoriteCity {
            id: conn.last_insert_rowid(),
            city_name,
        };
        tracing::info!(id = favorite.id, city = %favorite.city_name, "saved favorite");
        Ok(favorite)
    }

    /// Delete the favorite with `id` and return what was removed.
    ///
    /// # Errors
    /// `NotFound` if no row has this id.
    pub fn remove(&self, id: i64) -> FavoritesResult<FavoriteCity> {
        let removed = self
            .conn
            .lock()
            .query_row(
                "DELETE FROM favorite_city WHERE id = ?1 RETURNING id, city_name",
                params![id],
                row_to_favorite,
            )
            .optional()?
            .ok_or(FavoritesError::NotFound(id))?;

        tracing::info!(id, city = %removed.city_name, "removed favorite");
        Ok(removed)
    }

    /// All favorites in insertion order.
    pub fn list_all(&self) -> FavoritesResult<Vec<FavoriteCity>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, city_name FROM favorite_city ORDER BY id")?;
        let rows = stmt.query_map([], row_to_favorite)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn row_to_favorite(row: &rusqlite::Row) -> rusqlite::Result<FavoriteCity> {
    Ok(FavoriteCity {
        id: row.get(0)?,
        city_name: row.get(1)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
