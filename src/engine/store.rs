use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::model::*;

/// Failure in the underlying record collection. The engine surfaces this
/// as a generic storage error; it never partially applies a write.
#[derive(Debug)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// The injected record collection the engine runs against.
///
/// Minimum contract: atomic single-record insert, read-after-write within a
/// call chain, and `delete_room_cascade`/`replace_all_*` applied as single
/// logical units. Nothing here is a module-level singleton; the engine
/// owns an `Arc<dyn Store>` handed in at construction.
#[async_trait]
pub trait Store: Send + Sync {
    async fn schedule(&self) -> Result<DaySchedule, StoreError>;
    async fn set_schedule(&self, schedule: DaySchedule) -> Result<(), StoreError>;

    async fn rooms(&self) -> Result<Vec<Room>, StoreError>;
    async fn room(&self, id: &str) -> Result<Option<Room>, StoreError>;
    async fn upsert_room(&self, room: Room) -> Result<(), StoreError>;
    /// Remove the room and every booking referencing it, atomically.
    /// Returns the number of bookings removed.
    async fn delete_room_cascade(&self, id: &str) -> Result<u64, StoreError>;
    async fn replace_all_rooms(&self, rooms: Vec<Room>) -> Result<(), StoreError>;

    async fn bookings_for(
        &self,
        room_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, StoreError>;
    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError>;
    async fn booking(&self, id: Ulid) -> Result<Option<Booking>, StoreError>;
    async fn insert_booking(&self, booking: Booking) -> Result<(), StoreError>;
    /// Replace an existing booking record wholesale, keyed by id.
    async fn update_booking(&self, booking: Booking) -> Result<(), StoreError>;
    async fn remove_booking(&self, id: Ulid) -> Result<bool, StoreError>;
    async fn replace_all_bookings(&self, bookings: Vec<Booking>) -> Result<(), StoreError>;
}

/// In-memory reference store. Production deployments put a real database
/// behind the trait; tests and single-process hosts use this.
pub struct MemoryStore {
    schedule: RwLock<DaySchedule>,
    rooms: DashMap<String, Room>,
    bookings: DashMap<Ulid, Booking>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            schedule: RwLock::new(DaySchedule::default()),
            rooms: DashMap::new(),
            bookings: DashMap::new(),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn schedule(&self) -> Result<DaySchedule, StoreError> {
        Ok(*self.schedule.read().await)
    }

    async fn set_schedule(&self, schedule: DaySchedule) -> Result<(), StoreError> {
        *self.schedule.write().await = schedule;
        Ok(())
    }

    async fn rooms(&self) -> Result<Vec<Room>, StoreError> {
        let mut rooms: Vec<Room> = self.rooms.iter().map(|e| e.value().clone()).collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rooms)
    }

    async fn room(&self, id: &str) -> Result<Option<Room>, StoreError> {
        Ok(self.rooms.get(id).map(|e| e.value().clone()))
    }

    async fn upsert_room(&self, room: Room) -> Result<(), StoreError> {
        self.rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn delete_room_cascade(&self, id: &str) -> Result<u64, StoreError> {
        self.rooms.remove(id);
        let doomed: Vec<Ulid> = self
            .bookings
            .iter()
            .filter(|e| e.value().room_id == id)
            .map(|e| *e.key())
            .collect();
        for booking_id in &doomed {
            self.bookings.remove(booking_id);
        }
        Ok(doomed.len() as u64)
    }

    async fn replace_all_rooms(&self, rooms: Vec<Room>) -> Result<(), StoreError> {
        self.rooms.clear();
        for room in rooms {
            self.rooms.insert(room.id.clone(), room);
        }
        Ok(())
    }

    async fn bookings_for(
        &self,
        room_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, StoreError> {
        let mut found: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| e.value().room_id == room_id && e.value().date == date)
            .map(|e| e.value().clone())
            .collect();
        found.sort_by_key(|b| b.range.start);
        Ok(found)
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let mut all: Vec<Booking> = self.bookings.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| {
            (a.date, &a.room_id, a.range.start).cmp(&(b.date, &b.room_id, b.range.start))
        });
        Ok(all)
    }

    async fn booking(&self, id: Ulid) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.get(&id).map(|e| e.value().clone()))
    }

    async fn insert_booking(&self, booking: Booking) -> Result<(), StoreError> {
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn update_booking(&self, booking: Booking) -> Result<(), StoreError> {
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn remove_booking(&self, id: Ulid) -> Result<bool, StoreError> {
        Ok(self.bookings.remove(&id).is_some())
    }

    async fn replace_all_bookings(&self, bookings: Vec<Booking>) -> Result<(), StoreError> {
        self.bookings.clear();
        for booking in bookings {
            self.bookings.insert(booking.id, booking);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> Room {
        Room {
            id: id.into(),
            name: format!("Room {id}"),
            capacity: 4,
        }
    }

    fn booking(room_id: &str, date: &str, range: &str) -> Booking {
        Booking {
            id: Ulid::new(),
            room_id: room_id.into(),
            room_name: format!("Room {room_id}"),
            date: date.parse().unwrap(),
            range: range.parse().unwrap(),
            title: "Meeting".into(),
            user_name: "Kim".into(),
            user_email: "kim@example.com".into(),
        }
    }

    #[tokio::test]
    async fn read_after_write() {
        let store = MemoryStore::new();
        store.upsert_room(room("a")).await.unwrap();
        let b = booking("a", "2026-09-01", "09:00 - 10:00");
        store.insert_booking(b.clone()).await.unwrap();
        assert_eq!(store.booking(b.id).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn bookings_for_filters_and_sorts() {
        let store = MemoryStore::new();
        store
            .insert_booking(booking("a", "2026-09-01", "11:00 - 12:00"))
            .await
            .unwrap();
        store
            .insert_booking(booking("a", "2026-09-01", "09:00 - 10:00"))
            .await
            .unwrap();
        store
            .insert_booking(booking("a", "2026-09-02", "09:00 - 10:00"))
            .await
            .unwrap();
        store
            .insert_booking(booking("b", "2026-09-01", "09:00 - 10:00"))
            .await
            .unwrap();

        let found = store
            .bookings_for("a", "2026-09-01".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].range.start < found[1].range.start);
    }

    #[tokio::test]
    async fn cascade_removes_only_matching_bookings() {
        let store = MemoryStore::new();
        store.upsert_room(room("a")).await.unwrap();
        store.upsert_room(room("b")).await.unwrap();
        store
            .insert_booking(booking("a", "2026-09-01", "09:00 - 10:00"))
            .await
            .unwrap();
        store
            .insert_booking(booking("a", "2026-09-02", "09:00 - 10:00"))
            .await
            .unwrap();
        let keep = booking("b", "2026-09-01", "09:00 - 10:00");
        store.insert_booking(keep.clone()).await.unwrap();

        let removed = store.delete_room_cascade("a").await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.room("a").await.unwrap().is_none());
        assert!(store.room("b").await.unwrap().is_some());
        assert_eq!(store.all_bookings().await.unwrap(), vec![keep]);
    }
}
