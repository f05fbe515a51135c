//! `PostgreSQL` store.
//!
//! Coordinates are persisted as a `DOUBLE PRECISION[]` in `[lng, lat]` order
//! and converted through [`StoredCoordinate`] on the way in and out. Queries
//! use runtime-checked `query_as` so the crate builds without a database.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use songpin_core::geo::EARTH_RADIUS_M;
use songpin_core::{
    GeoPoint, NearbyPin, Pin, PinId, ProximityQuery, Song, StoredCoordinate, User, UserId,
};

use super::{PinStore, RepositoryError};

const PIN_COLUMNS: &str = "id, song, owner_id, coordinates, created_at";

/// A [`PinStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Delete every pin and user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either delete fails; nothing is
    /// removed in that case.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM pins").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    display_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = UserId::parse(&row.id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid user id in database: {e}"))
        })?;
        Ok(Self {
            id,
            display_name: row.display_name,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PinRow {
    id: Uuid,
    song: String,
    owner_id: String,
    coordinates: Vec<f64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PinRow> for Pin {
    type Error = RepositoryError;

    fn try_from(row: PinRow) -> Result<Self, Self::Error> {
        let song = Song::parse(&row.song).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid song in pin {}: {e}", row.id))
        })?;
        let owner_id = UserId::parse(&row.owner_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid owner in pin {}: {e}", row.id))
        })?;
        let coordinate = StoredCoordinate::from_slice(&row.coordinates)
            .and_then(GeoPoint::try_from)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid coordinates in pin {}: {e}",
                    row.id
                ))
            })?;

        Ok(Self {
            id: PinId::from_uuid(row.id),
            song,
            owner_id,
            coordinate,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct NearbyPinRow {
    #[sqlx(flatten)]
    pin: PinRow,
    distance_m: f64,
}

fn map_unique_violation(e: sqlx::Error, what: String) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what);
    }
    RepositoryError::Database(e)
}

impl PinStore for PgStore {
    fn ping(&self) -> BoxFuture<'_, Result<(), RepositoryError>> {
        async move {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        }
        .boxed()
    }

    fn create_user(&self, user: User) -> BoxFuture<'_, Result<User, RepositoryError>> {
        async move {
            let row = sqlx::query_as::<_, UserRow>(
                r"
                INSERT INTO users (id, display_name, created_at)
                VALUES ($1, $2, $3)
                RETURNING id, display_name, created_at
                ",
            )
            .bind(user.id.as_str())
            .bind(&user.display_name)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, format!("user {} already exists", user.id)))?;

            User::try_from(row)
        }
        .boxed()
    }

    fn get_user<'a>(
        &'a self,
        id: &'a UserId,
    ) -> BoxFuture<'a, Result<Option<User>, RepositoryError>> {
        async move {
            let row = sqlx::query_as::<_, UserRow>(
                "SELECT id, display_name, created_at FROM users WHERE id = $1",
            )
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

            row.map(User::try_from).transpose()
        }
        .boxed()
    }

    fn list_users(&self) -> BoxFuture<'_, Result<Vec<User>, RepositoryError>> {
        async move {
            let rows = sqlx::query_as::<_, UserRow>(
                "SELECT id, display_name, created_at FROM users ORDER BY seq",
            )
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter().map(User::try_from).collect()
        }
        .boxed()
    }

    fn delete_user<'a>(&'a self, id: &'a UserId) -> BoxFuture<'a, Result<(), RepositoryError>> {
        async move {
            let result = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(ref db_err) = e
                        && db_err.is_foreign_key_violation()
                    {
                        return RepositoryError::Conflict(format!("user {id} still has pins"));
                    }
                    RepositoryError::Database(e)
                })?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }
        .boxed()
    }

    fn create_pin(&self, pin: Pin) -> BoxFuture<'_, Result<Pin, RepositoryError>> {
        async move {
            let mut tx = self.pool.begin().await?;

            // Lock the owner row so it cannot be deleted before the insert lands
            let owner_exists = sqlx::query("SELECT 1 FROM users WHERE id = $1 FOR KEY SHARE")
                .bind(pin.owner_id.as_str())
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            if !owner_exists {
                return Err(RepositoryError::OwnerNotFound(pin.owner_id));
            }

            let row = sqlx::query_as::<_, PinRow>(&format!(
                r"
                INSERT INTO pins (id, song, owner_id, coordinates, created_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {PIN_COLUMNS}
                "
            ))
            .bind(pin.id)
            .bind(pin.song.as_str())
            .bind(pin.owner_id.as_str())
            .bind(pin.location().to_vec())
            .bind(pin.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, format!("pin {} already exists", pin.id)))?;

            tx.commit().await?;
            Pin::try_from(row)
        }
        .boxed()
    }

    fn get_pin(&self, id: PinId) -> BoxFuture<'_, Result<Option<Pin>, RepositoryError>> {
        async move {
            let row = sqlx::query_as::<_, PinRow>(&format!(
                "SELECT {PIN_COLUMNS} FROM pins WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(Pin::try_from).transpose()
        }
        .boxed()
    }

    fn pins_by_owner<'a>(
        &'a self,
        owner: &'a UserId,
    ) -> BoxFuture<'a, Result<Vec<Pin>, RepositoryError>> {
        async move {
            let rows = sqlx::query_as::<_, PinRow>(&format!(
                "SELECT {PIN_COLUMNS} FROM pins WHERE owner_id = $1 ORDER BY seq"
            ))
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter().map(Pin::try_from).collect()
        }
        .boxed()
    }

    fn nearby_pins(
        &self,
        query: ProximityQuery,
    ) -> BoxFuture<'_, Result<Vec<NearbyPin>, RepositoryError>> {
        async move {
            let center = query.center();
            tracing::debug!(
                center = %center,
                max_distance_m = query.max_distance_m(),
                "nearby pins query"
            );

            // Haversine on the same sphere as songpin_core::geo::haversine_m.
            // coordinates[1] is longitude, coordinates[2] latitude.
            let rows = sqlx::query_as::<_, NearbyPinRow>(&format!(
                r"
                SELECT {PIN_COLUMNS}, distance_m
                FROM (
                    SELECT {PIN_COLUMNS}, seq,
                        2 * $4 * asin(LEAST(1.0, sqrt(
                            power(sin(radians(coordinates[2] - $1) / 2), 2)
                            + cos(radians($1)) * cos(radians(coordinates[2]))
                              * power(sin(radians(coordinates[1] - $2) / 2), 2)
                        ))) AS distance_m
                    FROM pins
                ) AS ranked
                WHERE distance_m <= $3
                ORDER BY distance_m, seq
                "
            ))
            .bind(center.latitude())
            .bind(center.longitude())
            .bind(f64::from(query.max_distance_m()))
            .bind(EARTH_RADIUS_M)
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter()
                .map(|row| {
                    Ok(NearbyPin {
                        pin: Pin::try_from(row.pin)?,
                        distance_m: row.distance_m,
                    })
                })
                .collect()
        }
        .boxed()
    }

    fn delete_pin(&self, id: PinId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        async move {
            let result = sqlx::query("DELETE FROM pins WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(coordinates: Vec<f64>) -> PinRow {
        PinRow {
            id: Uuid::new_v4(),
            song: "Shape of You".to_string(),
            owner_id: "12345".to_string(),
            coordinates,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_pin_row_converts_lng_lat() {
        let pin = Pin::try_from(row(vec![-74.006, 40.7128])).unwrap();
        assert!((pin.coordinate.latitude() - 40.7128).abs() < f64::EPSILON);
        assert!((pin.coordinate.longitude() + 74.006).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_coordinates_are_corruption() {
        for bad in [vec![1.0], vec![1.0, 2.0, 3.0], vec![10.0, 95.0], vec![f64::NAN, 0.0]] {
            assert!(matches!(
                Pin::try_from(row(bad)),
                Err(RepositoryError::DataCorruption(_))
            ));
        }
    }

    #[test]
    fn test_blank_song_is_corruption() {
        let mut r = row(vec![0.0, 0.0]);
        r.song = "   ".to_string();
        assert!(matches!(
            Pin::try_from(r),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_user_row_with_bad_id_is_corruption() {
        let r = UserRow {
            id: "has space".to_string(),
            display_name: "Alice".to_string(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            User::try_from(r),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
