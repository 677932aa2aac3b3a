//! Coin repository implementation
//!
//! Grades are stored by their short code (`VF`, `UNC`, ...). Description
//! search uses `instr`, so it is case-sensitive and treats `%` and `_` as
//! ordinary characters.

use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::debug;

use core_kernel::{AlbumId, CoinId};
use domain_collection::{Coin, CoinKey, CoinRepository, Grade, RepositoryError, RepositoryResult};

use super::{narrow, parse_uuid};
use crate::error::DatabaseError;

const SELECT_COIN: &str =
    "SELECT id, grade, country, minting_year, description, note, album FROM coins";

const ORDER_COIN: &str = "ORDER BY country, minting_year, description, note";

/// Coin row as stored
#[derive(Debug, sqlx::FromRow)]
struct CoinRow {
    id: String,
    grade: String,
    country: String,
    minting_year: i64,
    description: String,
    note: String,
    album: String,
}

impl TryFrom<CoinRow> for Coin {
    type Error = DatabaseError;

    fn try_from(row: CoinRow) -> Result<Self, Self::Error> {
        let grade = row
            .grade
            .parse::<Grade>()
            .map_err(|e| DatabaseError::InvalidData(format!("coins.grade: {e}")))?;

        Ok(Coin {
            id: Some(CoinId::from_uuid(parse_uuid("coins.id", &row.id)?)),
            grade,
            country: row.country,
            minting_year: narrow("coins.minting_year", row.minting_year)?,
            description: row.description,
            note: row.note,
            album: AlbumId::from_uuid(parse_uuid("coins.album", &row.album)?),
        })
    }
}

fn into_coins(rows: Vec<CoinRow>) -> RepositoryResult<Vec<Coin>> {
    rows.into_iter()
        .map(|row| Coin::try_from(row).map_err(RepositoryError::from))
        .collect()
}

/// Coin repository bound to one transaction's connection
pub struct SqlxCoinRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqlxCoinRepository<'c> {
    /// Creates a repository over the given connection
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CoinRepository for SqlxCoinRepository<'_> {
    async fn find_all(&mut self) -> RepositoryResult<Vec<Coin>> {
        let rows = sqlx::query_as::<_, CoinRow>(&format!("{SELECT_COIN} {ORDER_COIN}"))
            .fetch_all(&mut *self.conn)
            .await
            .map_err(DatabaseError::from)?;
        into_coins(rows)
    }

    async fn find_by_id(&mut self, id: CoinId) -> RepositoryResult<Option<Coin>> {
        let row = sqlx::query_as::<_, CoinRow>(&format!("{SELECT_COIN} WHERE id = ?"))
            .bind(id.as_uuid().to_string())
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(DatabaseError::from)?;
        Ok(row.map(Coin::try_from).transpose()?)
    }

    async fn find_by_description(&mut self, substring: &str) -> RepositoryResult<Vec<Coin>> {
        let rows = sqlx::query_as::<_, CoinRow>(&format!(
            "{SELECT_COIN} WHERE instr(description, ?) > 0 {ORDER_COIN}"
        ))
        .bind(substring)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(DatabaseError::from)?;
        into_coins(rows)
    }

    async fn find_by_album(&mut self, album: AlbumId) -> RepositoryResult<Vec<Coin>> {
        let rows = sqlx::query_as::<_, CoinRow>(&format!(
            "{SELECT_COIN} WHERE album = ? {ORDER_COIN}"
        ))
        .bind(album.as_uuid().to_string())
        .fetch_all(&mut *self.conn)
        .await
        .map_err(DatabaseError::from)?;
        into_coins(rows)
    }

    async fn find_by_key(&mut self, key: &CoinKey) -> RepositoryResult<Option<Coin>> {
        if key.country.trim().is_empty() || key.description.trim().is_empty() {
            return Err(RepositoryError::invalid_argument(
                "coin country and description are required",
            ));
        }

        let row = sqlx::query_as::<_, CoinRow>(&format!(
            "{SELECT_COIN} WHERE grade = ? AND country = ? AND minting_year = ? \
             AND description = ? AND note = ?"
        ))
        .bind(key.grade.code())
        .bind(&key.country)
        .bind(i64::from(key.minting_year))
        .bind(&key.description)
        .bind(&key.note)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(DatabaseError::from)?;
        Ok(row.map(Coin::try_from).transpose()?)
    }

    async fn save(&mut self, coin: &Coin) -> RepositoryResult<Coin> {
        coin.validate()?;

        match coin.id {
            None => {
                let id = CoinId::generate();
                sqlx::query(
                    "INSERT INTO coins (id, grade, country, minting_year, description, note, album) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(id.as_uuid().to_string())
                .bind(coin.grade.code())
                .bind(&coin.country)
                .bind(i64::from(coin.minting_year))
                .bind(&coin.description)
                .bind(&coin.note)
                .bind(coin.album.as_uuid().to_string())
                .execute(&mut *self.conn)
                .await
                .map_err(DatabaseError::from)?;

                debug!(coin_id = %id, "Inserted coin row");
                Ok(Coin {
                    id: Some(id),
                    ..coin.clone()
                })
            }
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE coins SET grade = ?, country = ?, minting_year = ?, \
                     description = ?, note = ?, album = ? WHERE id = ?",
                )
                .bind(coin.grade.code())
                .bind(&coin.country)
                .bind(i64::from(coin.minting_year))
                .bind(&coin.description)
                .bind(&coin.note)
                .bind(coin.album.as_uuid().to_string())
                .bind(id.as_uuid().to_string())
                .execute(&mut *self.conn)
                .await
                .map_err(DatabaseError::from)?;

                if result.rows_affected() == 0 {
                    return Err(DatabaseError::missing_row("Coin", id).into());
                }
                Ok(coin.clone())
            }
        }
    }

    async fn delete(&mut self, coin: &Coin) -> RepositoryResult<()> {
        let id = coin
            .id
            .ok_or_else(|| RepositoryError::invalid_argument("coin id is required"))?;

        let result = sqlx::query("DELETE FROM coins WHERE id = ?")
            .bind(id.as_uuid().to_string())
            .execute(&mut *self.conn)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::missing_row("Coin", id).into());
        }
        debug!(coin_id = %id, "Deleted coin row");
        Ok(())
    }
}
