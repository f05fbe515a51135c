//! In-memory store.
//!
//! Rows live in insertion-ordered vectors behind a single lock, so every
//! write is atomic and listing order matches the `PostgreSQL` backend.

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use songpin_core::proximity::rank_nearby;
use songpin_core::{NearbyPin, Pin, PinId, ProximityQuery, User, UserId};

use super::{PinStore, RepositoryError};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    pins: Vec<Pin>,
}

/// A [`PinStore`] kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PinStore for MemoryStore {
    fn ping(&self) -> BoxFuture<'_, Result<(), RepositoryError>> {
        async { Ok(()) }.boxed()
    }

    fn create_user(&self, user: User) -> BoxFuture<'_, Result<User, RepositoryError>> {
        async move {
            let mut tables = self.tables.write().await;
            if tables.users.iter().any(|u| u.id == user.id) {
                return Err(RepositoryError::Conflict(format!(
                    "user {} already exists",
                    user.id
                )));
            }
            tables.users.push(user.clone());
            Ok(user)
        }
        .boxed()
    }

    fn get_user<'a>(
        &'a self,
        id: &'a UserId,
    ) -> BoxFuture<'a, Result<Option<User>, RepositoryError>> {
        async move {
            let tables = self.tables.read().await;
            Ok(tables.users.iter().find(|u| &u.id == id).cloned())
        }
        .boxed()
    }

    fn list_users(&self) -> BoxFuture<'_, Result<Vec<User>, RepositoryError>> {
        async move { Ok(self.tables.read().await.users.clone()) }.boxed()
    }

    fn delete_user<'a>(&'a self, id: &'a UserId) -> BoxFuture<'a, Result<(), RepositoryError>> {
        async move {
            let mut tables = self.tables.write().await;
            let index = tables
                .users
                .iter()
                .position(|u| &u.id == id)
                .ok_or(RepositoryError::NotFound)?;
            if tables.pins.iter().any(|p| &p.owner_id == id) {
                return Err(RepositoryError::Conflict(format!(
                    "user {id} still has pins"
                )));
            }
            tables.users.remove(index);
            Ok(())
        }
        .boxed()
    }

    fn create_pin(&self, pin: Pin) -> BoxFuture<'_, Result<Pin, RepositoryError>> {
        async move {
            let mut tables = self.tables.write().await;
            if !tables.users.iter().any(|u| u.id == pin.owner_id) {
                return Err(RepositoryError::OwnerNotFound(pin.owner_id));
            }
            if tables.pins.iter().any(|p| p.id == pin.id) {
                return Err(RepositoryError::Conflict(format!(
                    "pin {} already exists",
                    pin.id
                )));
            }
            tables.pins.push(pin.clone());
            Ok(pin)
        }
        .boxed()
    }

    fn get_pin(&self, id: PinId) -> BoxFuture<'_, Result<Option<Pin>, RepositoryError>> {
        async move {
            let tables = self.tables.read().await;
            Ok(tables.pins.iter().find(|p| p.id == id).cloned())
        }
        .boxed()
    }

    fn pins_by_owner<'a>(
        &'a self,
        owner: &'a UserId,
    ) -> BoxFuture<'a, Result<Vec<Pin>, RepositoryError>> {
        async move {
            let tables = self.tables.read().await;
            Ok(tables
                .pins
                .iter()
                .filter(|p| &p.owner_id == owner)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn nearby_pins(
        &self,
        query: ProximityQuery,
    ) -> BoxFuture<'_, Result<Vec<NearbyPin>, RepositoryError>> {
        async move {
            let tables = self.tables.read().await;
            Ok(rank_nearby(&query, &tables.pins))
        }
        .boxed()
    }

    fn delete_pin(&self, id: PinId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        async move {
            let mut tables = self.tables.write().await;
            let before = tables.pins.len();
            tables.pins.retain(|p| p.id != id);
            Ok(tables.pins.len() != before)
        }
        .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use songpin_core::{GeoPoint, Song};

    fn user(id: &str, name: &str) -> User {
        User::new(UserId::parse(id).unwrap(), name).unwrap()
    }

    fn pin(song: &str, owner: &str, lat: f64, lng: f64) -> Pin {
        Pin::new(
            Song::parse(song).unwrap(),
            UserId::parse(owner).unwrap(),
            GeoPoint::new(lat, lng).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_duplicate_user_conflicts() {
        let store = MemoryStore::new();
        store.create_user(user("12345", "Alice")).await.unwrap();
        let err = store.create_user(user("12345", "Alice again")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pin_for_unknown_owner_is_not_persisted() {
        let store = MemoryStore::new();
        let err = store
            .create_pin(pin("Shape of You", "nobody", 40.7128, -74.006))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::OwnerNotFound(_)));

        let owner = UserId::parse("nobody").unwrap();
        assert!(store.pins_by_owner(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pins_by_owner_in_insertion_order() {
        let store = MemoryStore::new();
        store.create_user(user("12345", "Alice")).await.unwrap();
        store.create_user(user("67890", "Bob")).await.unwrap();
        for (song, owner) in [("one", "12345"), ("two", "67890"), ("three", "12345")] {
            store.create_pin(pin(song, owner, 1.0, 1.0)).await.unwrap();
        }

        let alice = UserId::parse("12345").unwrap();
        let songs: Vec<_> = store
            .pins_by_owner(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.song.to_string())
            .collect();
        assert_eq!(songs, ["one", "three"]);
    }

    #[tokio::test]
    async fn test_delete_pin_is_idempotent() {
        let store = MemoryStore::new();
        store.create_user(user("12345", "Alice")).await.unwrap();
        let created = store.create_pin(pin("x", "12345", 0.0, 0.0)).await.unwrap();

        assert!(store.delete_pin(created.id).await.unwrap());
        assert!(!store.delete_pin(created.id).await.unwrap());
        assert!(store.get_pin(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_with_pins_conflicts() {
        let store = MemoryStore::new();
        store.create_user(user("12345", "Alice")).await.unwrap();
        let created = store.create_pin(pin("x", "12345", 0.0, 0.0)).await.unwrap();
        let id = UserId::parse("12345").unwrap();

        assert!(matches!(
            store.delete_user(&id).await.unwrap_err(),
            RepositoryError::Conflict(_)
        ));

        store.delete_pin(created.id).await.unwrap();
        store.delete_user(&id).await.unwrap();
        assert!(matches!(
            store.delete_user(&id).await.unwrap_err(),
            RepositoryError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_nearby_pins() {
        let store = MemoryStore::new();
        store.create_user(user("12345", "Alice")).await.unwrap();
        store
            .create_pin(pin("Shape of You", "12345", 40.7128, -74.006))
            .await
            .unwrap();
        store
            .create_pin(pin("Blinding Lights", "12345", 34.0522, -118.2437))
            .await
            .unwrap();

        let query = ProximityQuery::new(GeoPoint::new(40.7128, -74.006).unwrap(), 10_000).unwrap();
        let hits = store.nearby_pins(query).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pin.song.as_str(), "Shape of You");
    }
}
