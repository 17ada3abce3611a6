use chrono::{Datelike, NaiveDate, Weekday};

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::availability::{free_slots, generate_day_slots, mark_booking};
use super::conflict::{parse_date, today, validate_room_id};
use super::{Engine, EngineError};

impl Engine {
    /// Free atomic slots for one room on one day, under the schedule in
    /// effect right now. Idempotent between writes.
    pub async fn list_available_slots(
        &self,
        room_id: &str,
        date: &str,
    ) -> Result<Vec<TimeRange>, EngineError> {
        validate_room_id(room_id)?;
        let date = parse_date("date", date)?;
        if self.store.room(room_id).await?.is_none() {
            return Err(EngineError::NotFound(room_id.to_string()));
        }

        let schedule = self.store.schedule().await?;
        let slots = generate_day_slots(&schedule);
        let bookings = self.store.bookings_for(room_id, date).await?;

        metrics::counter!(observability::AVAILABILITY_QUERIES_TOTAL).increment(1);
        Ok(free_slots(&slots, &bookings))
    }

    /// Occupancy grid for every room over the next `window_days` working
    /// days, starting from and including today.
    pub async fn daily_usage(&self, window_days: usize) -> Result<Vec<RoomUsage>, EngineError> {
        self.daily_usage_from(today(), window_days).await
    }

    /// Same as [`daily_usage`](Engine::daily_usage) with an explicit start
    /// day, which also keeps the window deterministic for tests.
    pub async fn daily_usage_from(
        &self,
        from: NaiveDate,
        window_days: usize,
    ) -> Result<Vec<RoomUsage>, EngineError> {
        if window_days == 0 || window_days > MAX_USAGE_WINDOW_DAYS {
            return Err(EngineError::validation(
                "window_days",
                format!("must be 1..={MAX_USAGE_WINDOW_DAYS}"),
            ));
        }

        let schedule = self.store.schedule().await?;
        let slots = generate_day_slots(&schedule);
        let days = working_days(from, window_days);
        let rooms = self.store.rooms().await?;

        let mut usage = Vec::with_capacity(rooms.len());
        for room in rooms {
            let mut day_grids = Vec::with_capacity(days.len());
            for &date in &days {
                let mut statuses: Vec<SlotStatus> = slots
                    .iter()
                    .map(|s| SlotStatus {
                        slot: *s,
                        booked: None,
                    })
                    .collect();
                for booking in self.store.bookings_for(&room.id, date).await? {
                    mark_booking(&mut statuses, &booking);
                }
                day_grids.push(DayUsage {
                    date,
                    slots: statuses,
                });
            }
            usage.push(RoomUsage {
                room,
                days: day_grids,
            });
        }

        metrics::counter!(observability::USAGE_QUERIES_TOTAL).increment(1);
        Ok(usage)
    }

    /// Full observable state: schedule, rooms, bookings. Feeding the result
    /// back into [`import_snapshot`](Engine::import_snapshot) reproduces it
    /// exactly.
    pub async fn export_snapshot(&self) -> Result<Snapshot, EngineError> {
        Ok(Snapshot {
            schedule: self.store.schedule().await?,
            rooms: self.store.rooms().await?,
            bookings: self.store.all_bookings().await?,
        })
    }
}

/// The next `count` non-weekend days, `from` included if it qualifies.
fn working_days(from: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut day = from;
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn working_days_skip_weekends() {
        // 2026-08-28 is a Friday.
        let days = working_days(d("2026-08-28"), 5);
        assert_eq!(
            days,
            vec![
                d("2026-08-28"),
                d("2026-08-31"),
                d("2026-09-01"),
                d("2026-09-02"),
                d("2026-09-03"),
            ]
        );
    }

    #[test]
    fn working_days_weekend_start_excluded() {
        // Starting on a Saturday: the window begins the following Monday.
        let days = working_days(d("2026-08-29"), 2);
        assert_eq!(days, vec![d("2026-08-31"), d("2026-09-01")]);
    }
}
