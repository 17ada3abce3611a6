use tracing::warn;

use crate::model::*;

// ── Slot Algorithms ───────────────────────────────────────────────

/// Generate the canonical ordered slot grid for one day.
///
/// A cursor starts at `start_of_day` and emits `[cursor, cursor + duration)`
/// until the next slot would start at or run past `end_of_day`. A partial
/// trailing slot is dropped, never truncated. An empty or inverted window
/// yields an empty grid.
pub fn generate_day_slots(schedule: &DaySchedule) -> Vec<TimeRange> {
    let mut slots = Vec::new();
    if schedule.slot_minutes == 0 {
        return slots;
    }
    let mut cursor = schedule.start_of_day;
    while cursor < schedule.end_of_day {
        let Some(end) = cursor.plus(schedule.slot_minutes) else {
            break;
        };
        if end > schedule.end_of_day {
            break;
        }
        slots.push(TimeRange::new(cursor, end));
        cursor = end;
    }
    slots
}

/// Filter the slot grid down to slots free of every booking.
///
/// A slot is taken iff it open-interval-overlaps any booking's range, so a
/// booking ending at 11:00 leaves the 11:00 slot free.
pub fn free_slots(slots: &[TimeRange], bookings: &[Booking]) -> Vec<TimeRange> {
    slots
        .iter()
        .copied()
        .filter(|slot| !bookings.iter().any(|b| b.range.overlaps(slot)))
        .collect()
}

/// Annotate a usage grid with one booking.
///
/// The walk steps through the booking's `[start, end)` from the booking's
/// own start, marking only slots whose start the cursor hits exactly. A
/// booking aligned to an older grid (schedule changed since it was made)
/// therefore may leave partially-covered slots unmarked; that is the
/// documented display behavior, not an error.
pub fn mark_booking(statuses: &mut [SlotStatus], booking: &Booking) {
    let mut cursor = booking.range.start;
    while cursor < booking.range.end {
        let Some(status) = statuses.iter_mut().find(|s| s.slot.start == cursor) else {
            // The grid is uniform, so no later step can land on a slot
            // start either.
            break;
        };
        if let Some(prev) = &status.booked {
            // Two bookings covering one slot means corrupt data. Keep
            // serving; last write in iteration order wins.
            warn!(
                slot = %status.slot,
                date = %booking.date,
                room = %booking.room_id,
                prev = %prev.booking_id,
                next = %booking.id,
                "slot double-assigned, overwriting"
            );
        }
        status.booked = Some(SlotBooking {
            booking_id: booking.id,
            title: booking.title.clone(),
            user_name: booking.user_name.clone(),
        });
        cursor = status.slot.end;
    }
}
