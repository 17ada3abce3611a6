use std::time::Instant;

use tracing::info;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::availability::{free_slots, generate_day_slots};
use super::conflict::{
    parse_date, parse_time, range_is_free, validate_details, validate_room, validate_room_id,
};
use super::{Engine, EngineError};

/// A reservation request as it arrives from the UI layer: all strings.
/// Parsing and validation happen here, before any store access.
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub room_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, must align to an atomic-slot boundary
    pub start: String,
    /// `HH:MM`, must be reachable from `start` by whole free slots
    pub end: String,
    pub title: String,
    pub user_name: String,
    pub user_email: String,
}

impl Engine {
    /// Validate and atomically reserve a contiguous range of atomic slots.
    ///
    /// Availability is recomputed fresh inside the per-(room, date) mutex
    /// and the insert happens before the mutex drops. Of N concurrent
    /// requests for the same range, exactly one commits; the rest get
    /// [`EngineError::Conflict`]. All-or-nothing: a rejected request leaves
    /// no partial state.
    pub async fn reserve_range(&self, req: &ReserveRequest) -> Result<Booking, EngineError> {
        let started = Instant::now();

        validate_room_id(&req.room_id)?;
        validate_details(&req.title, &req.user_name, &req.user_email)?;
        let date = parse_date("date", &req.date)?;
        let start = parse_time("start", &req.start)?;
        let end = parse_time("end", &req.end)?;
        if start >= end {
            return Err(EngineError::validation("end", "must be after start"));
        }
        let room = self
            .store
            .room(&req.room_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(req.room_id.clone()))?;

        let lock = self.day_lock(&room.id, date);
        let _guard = lock.lock().await;

        // Never reuse availability computed earlier in the request
        // lifecycle: another booking may have landed since.
        let schedule = self.store.schedule().await?;
        let slots = generate_day_slots(&schedule);
        let bookings = self.store.bookings_for(&room.id, date).await?;
        let free = free_slots(&slots, &bookings);

        let range = TimeRange::new(start, end);
        if !range_is_free(&free, start, end) {
            metrics::counter!(observability::RESERVATION_CONFLICTS_TOTAL).increment(1);
            return Err(EngineError::Conflict {
                room_id: room.id,
                date,
                range,
            });
        }

        let booking = Booking {
            id: Ulid::new(),
            room_id: room.id,
            room_name: room.name,
            date,
            range,
            title: req.title.clone(),
            user_name: req.user_name.clone(),
            user_email: req.user_email.clone(),
        };
        self.store.insert_booking(booking.clone()).await?;

        metrics::counter!(observability::RESERVATIONS_TOTAL).increment(1);
        metrics::histogram!(observability::RESERVATION_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        info!(
            booking = %booking.id,
            room = %booking.room_id,
            date = %booking.date,
            range = %booking.range,
            "reserved"
        );
        Ok(booking)
    }

    /// Edit a booking's display fields. The time range is immutable after
    /// creation; rebooking is delete + reserve.
    pub async fn update_booking_details(
        &self,
        id: Ulid,
        actor: &Actor,
        title: &str,
        user_name: &str,
        user_email: &str,
    ) -> Result<Booking, EngineError> {
        validate_details(title, user_name, user_email)?;
        let mut booking = self
            .store
            .booking(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))?;
        permit(actor, &booking)?;

        booking.title = title.to_string();
        booking.user_name = user_name.to_string();
        booking.user_email = user_email.to_string();
        self.store.update_booking(booking.clone()).await?;
        Ok(booking)
    }

    pub async fn delete_booking(&self, id: Ulid, actor: &Actor) -> Result<(), EngineError> {
        let booking = self
            .store
            .booking(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))?;
        permit(actor, &booking)?;

        if !self.store.remove_booking(id).await? {
            return Err(EngineError::BookingNotFound(id));
        }
        info!(booking = %id, room = %booking.room_id, "booking deleted");
        Ok(())
    }

    // ── Admin: rooms ─────────────────────────────────────────

    pub async fn create_room(&self, room: Room) -> Result<(), EngineError> {
        validate_room(&room)?;
        if self.store.rooms().await?.len() >= MAX_ROOMS {
            return Err(EngineError::validation("room_id", "too many rooms"));
        }
        if self.store.room(&room.id).await?.is_some() {
            return Err(EngineError::AlreadyExists(room.id));
        }
        self.store.upsert_room(room).await?;
        Ok(())
    }

    /// Update name/capacity. The denormalized `room_name` on existing
    /// bookings is display-only and intentionally left as written.
    pub async fn update_room(&self, room: Room) -> Result<(), EngineError> {
        validate_room(&room)?;
        if self.store.room(&room.id).await?.is_none() {
            return Err(EngineError::NotFound(room.id));
        }
        self.store.upsert_room(room).await?;
        Ok(())
    }

    /// Delete a room and cascade to all of its bookings, as one logical
    /// store operation. Returns the number of bookings removed.
    pub async fn delete_room(&self, room_id: &str) -> Result<u64, EngineError> {
        validate_room_id(room_id)?;
        let _guard = self.admin_lock.lock().await;
        if self.store.room(room_id).await?.is_none() {
            return Err(EngineError::NotFound(room_id.to_string()));
        }
        let removed = self.store.delete_room_cascade(room_id).await?;
        metrics::counter!(observability::CASCADE_DELETED_BOOKINGS_TOTAL).increment(removed);
        info!(room = %room_id, bookings_removed = removed, "room deleted");
        Ok(removed)
    }

    // ── Admin: schedule & snapshot ───────────────────────────

    /// Replace the work-day configuration. Takes effect on the next read;
    /// existing bookings are never reconciled to the new grid.
    pub async fn set_schedule(&self, schedule: DaySchedule) -> Result<(), EngineError> {
        schedule
            .validate()
            .map_err(|msg| EngineError::validation("schedule", msg))?;
        self.store.set_schedule(schedule).await?;
        Ok(())
    }

    /// Replace the whole dataset with a previously exported snapshot.
    pub async fn import_snapshot(&self, snapshot: Snapshot) -> Result<(), EngineError> {
        snapshot
            .schedule
            .validate()
            .map_err(|msg| EngineError::validation("schedule", msg))?;
        for room in &snapshot.rooms {
            validate_room(room)?;
        }
        for booking in &snapshot.bookings {
            if !snapshot.rooms.iter().any(|r| r.id == booking.room_id) {
                return Err(EngineError::validation(
                    "bookings",
                    format!("booking {} references unknown room {}", booking.id, booking.room_id),
                ));
            }
        }

        let _guard = self.admin_lock.lock().await;
        self.store.set_schedule(snapshot.schedule).await?;
        self.store.replace_all_rooms(snapshot.rooms).await?;
        self.store.replace_all_bookings(snapshot.bookings).await?;
        info!("snapshot imported");
        Ok(())
    }
}

fn permit(actor: &Actor, booking: &Booking) -> Result<(), EngineError> {
    if actor.admin || actor.email == booking.user_email {
        Ok(())
    } else {
        Err(EngineError::Forbidden(booking.id))
    }
}
