//! Album repository implementation

use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::debug;

use core_kernel::AlbumId;
use domain_collection::{Album, AlbumRepository, RepositoryError, RepositoryResult};

use super::{narrow, parse_uuid};
use crate::error::DatabaseError;

const SELECT_ALBUM: &str =
    "SELECT id, name, volume, location, number_of_slots, occupied_slots FROM albums";

/// Album row as stored
#[derive(Debug, sqlx::FromRow)]
struct AlbumRow {
    id: String,
    name: String,
    volume: i64,
    location: String,
    number_of_slots: i64,
    occupied_slots: i64,
}

impl TryFrom<AlbumRow> for Album {
    type Error = DatabaseError;

    fn try_from(row: AlbumRow) -> Result<Self, Self::Error> {
        Ok(Album {
            id: Some(AlbumId::from_uuid(parse_uuid("albums.id", &row.id)?)),
            name: row.name,
            volume: narrow("albums.volume", row.volume)?,
            location: row.location,
            number_of_slots: narrow("albums.number_of_slots", row.number_of_slots)?,
            occupied_slots: narrow("albums.occupied_slots", row.occupied_slots)?,
        })
    }
}

fn into_albums(rows: Vec<AlbumRow>) -> RepositoryResult<Vec<Album>> {
    rows.into_iter()
        .map(|row| Album::try_from(row).map_err(RepositoryError::from))
        .collect()
}

/// Album repository bound to one transaction's connection
pub struct SqlxAlbumRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqlxAlbumRepository<'c> {
    /// Creates a repository over the given connection
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl AlbumRepository for SqlxAlbumRepository<'_> {
    async fn find_all(&mut self) -> RepositoryResult<Vec<Album>> {
        let rows = sqlx::query_as::<_, AlbumRow>(&format!("{SELECT_ALBUM} ORDER BY name, volume"))
            .fetch_all(&mut *self.conn)
            .await
            .map_err(DatabaseError::from)?;
        into_albums(rows)
    }

    async fn find_by_id(&mut self, id: AlbumId) -> RepositoryResult<Option<Album>> {
        let row = sqlx::query_as::<_, AlbumRow>(&format!("{SELECT_ALBUM} WHERE id = ?"))
            .bind(id.as_uuid().to_string())
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(DatabaseError::from)?;
        Ok(row.map(Album::try_from).transpose()?)
    }

    async fn find_by_name_and_volume(
        &mut self,
        name: &str,
        volume: u32,
    ) -> RepositoryResult<Option<Album>> {
        if name.trim().is_empty() {
            return Err(RepositoryError::invalid_argument("album name is required"));
        }

        let row = sqlx::query_as::<_, AlbumRow>(&format!(
            "{SELECT_ALBUM} WHERE name = ? AND volume = ?"
        ))
        .bind(name)
        .bind(i64::from(volume))
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(DatabaseError::from)?;
        Ok(row.map(Album::try_from).transpose()?)
    }

    async fn save(&mut self, album: &Album) -> RepositoryResult<Album> {
        album.validate()?;

        match album.id {
            None => {
                let id = AlbumId::generate();
                sqlx::query(
                    "INSERT INTO albums (id, name, volume, location, number_of_slots, occupied_slots) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(id.as_uuid().to_string())
                .bind(&album.name)
                .bind(i64::from(album.volume))
                .bind(&album.location)
                .bind(i64::from(album.number_of_slots))
                .bind(i64::from(album.occupied_slots))
                .execute(&mut *self.conn)
                .await
                .map_err(DatabaseError::from)?;

                debug!(album_id = %id, "Inserted album row");
                Ok(Album {
                    id: Some(id),
                    ..album.clone()
                })
            }
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE albums SET name = ?, volume = ?, location = ?, \
                     number_of_slots = ?, occupied_slots = ? WHERE id = ?",
                )
                .bind(&album.name)
                .bind(i64::from(album.volume))
                .bind(&album.location)
                .bind(i64::from(album.number_of_slots))
                .bind(i64::from(album.occupied_slots))
                .bind(id.as_uuid().to_string())
                .execute(&mut *self.conn)
                .await
                .map_err(DatabaseError::from)?;

                if result.rows_affected() == 0 {
                    return Err(DatabaseError::missing_row("Album", id).into());
                }
                Ok(album.clone())
            }
        }
    }

    async fn delete(&mut self, album: &Album) -> RepositoryResult<()> {
        let id = album
            .id
            .ok_or_else(|| RepositoryError::invalid_argument("album id is required"))?;

        let result = sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(id.as_uuid().to_string())
            .execute(&mut *self.conn)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::missing_row("Album", id).into());
        }
        debug!(album_id = %id, "Deleted album row");
        Ok(())
    }
}
