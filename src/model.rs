use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ulid::Ulid;

use crate::limits::*;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minutes since midnight — the only time-of-day type.
///
/// The external representation is always `"HH:MM"`; internally everything
/// is minute arithmetic. `24:00` is accepted as an end-of-day sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn hm(hour: u16, minute: u16) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Advance by `minutes`; past midnight is `None`.
    pub fn plus(&self, minutes: u16) -> Option<Self> {
        Self::from_minutes(self.0.checked_add(minutes)?)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("invalid time {s:?}, expected HH:MM");
        let (h, m) = s.split_once(':').ok_or_else(bad)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(bad());
        }
        let hour: u16 = h.parse().map_err(|_| bad())?;
        let minute: u16 = m.parse().map_err(|_| bad())?;
        Self::hm(hour, minute).ok_or_else(bad)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Half-open interval `[start, end)` within one day.
///
/// Used both for atomic slots and for booking ranges. The wire label is
/// `"HH:MM - HH:MM"`; that string form never leaks past parse/format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        debug_assert!(start < end, "TimeRange start must be before end");
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    /// Open-interval overlap: touching endpoints do not overlap, so
    /// back-to-back bookings are allowed.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(" - ")
            .ok_or_else(|| format!("invalid range {s:?}, expected \"HH:MM - HH:MM\""))?;
        let start: TimeOfDay = a.parse()?;
        let end: TimeOfDay = b.parse()?;
        if start >= end {
            return Err(format!("invalid range {s:?}: start must be before end"));
        }
        Ok(Self { start, end })
    }
}

impl Serialize for TimeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Global work-day configuration. Read fresh on every engine call — a
/// schedule change takes effect on the next read, never retroactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub slot_minutes: u16,
    pub start_of_day: TimeOfDay,
    pub end_of_day: TimeOfDay,
}

impl DaySchedule {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.slot_minutes < MIN_SLOT_MINUTES || self.slot_minutes > MAX_SLOT_MINUTES {
            return Err("slot duration out of range");
        }
        if self.slot_minutes % SLOT_MINUTES_STEP != 0 {
            return Err("slot duration must be a multiple of 15 minutes");
        }
        if self.start_of_day >= self.end_of_day {
            return Err("end of day must be after start of day");
        }
        Ok(())
    }
}

impl Default for DaySchedule {
    fn default() -> Self {
        Self {
            slot_minutes: 60,
            start_of_day: TimeOfDay::hm(9, 0).unwrap(),
            end_of_day: TimeOfDay::hm(17, 0).unwrap(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub capacity: u32,
}

/// A confirmed reservation covering one or more contiguous atomic slots.
///
/// `room_name` is denormalized for display only; `room_id` is the identity.
/// The range is immutable after creation — edits touch title and user
/// fields only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub room_id: String,
    pub room_name: String,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub title: String,
    pub user_name: String,
    pub user_email: String,
}

impl Booking {
    /// The `"HH:MM - HH:MM"` form shown to callers.
    pub fn time_label(&self) -> String {
        self.range.to_string()
    }
}

/// One atomic slot in a usage grid — derived per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    pub slot: TimeRange,
    pub booked: Option<SlotBooking>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotBooking {
    pub booking_id: Ulid,
    pub title: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayUsage {
    pub date: NaiveDate,
    pub slots: Vec<SlotStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomUsage {
    pub room: Room,
    pub days: Vec<DayUsage>,
}

/// Full-dataset export/import unit. Exporting and re-importing a snapshot
/// reproduces identical observable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schedule: DaySchedule,
    pub rooms: Vec<Room>,
    pub bookings: Vec<Booking>,
}

/// Caller-supplied identity for permissioned operations. Session and
/// cookie mechanics live entirely outside this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub email: String,
    pub admin: bool,
}

impl Actor {
    pub fn admin() -> Self {
        Self {
            email: String::new(),
            admin: true,
        }
    }

    pub fn user(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            admin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn time_of_day_parse_and_format() {
        assert_eq!(t("09:05").minutes(), 9 * 60 + 5);
        assert_eq!(t("00:00").minutes(), 0);
        assert_eq!(t("24:00").minutes(), MINUTES_PER_DAY);
        assert_eq!(t("16:30").to_string(), "16:30");
    }

    #[test]
    fn time_of_day_rejects_garbage() {
        for s in ["", "9:00", "09:0", "09-00", "25:00", "09:60", "ab:cd", "09:00:00"] {
            assert!(s.parse::<TimeOfDay>().is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn time_of_day_plus_stops_at_midnight() {
        assert_eq!(t("23:00").plus(60), Some(t("24:00")));
        assert_eq!(t("23:30").plus(60), None);
    }

    #[test]
    fn range_overlap_is_open_interval() {
        let a = TimeRange::new(t("10:00"), t("11:00"));
        let b = TimeRange::new(t("10:30"), t("11:30"));
        let c = TimeRange::new(t("11:00"), t("12:00"));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // touching, not overlapping
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn range_label_round_trip() {
        let r: TimeRange = "09:00 - 10:30".parse().unwrap();
        assert_eq!(r.start, t("09:00"));
        assert_eq!(r.end, t("10:30"));
        assert_eq!(r.to_string(), "09:00 - 10:30");
        assert!("10:00 - 10:00".parse::<TimeRange>().is_err());
        assert!("10:00 - 09:00".parse::<TimeRange>().is_err());
        assert!("10:00-11:00".parse::<TimeRange>().is_err());
    }

    #[test]
    fn schedule_validation() {
        assert!(DaySchedule::default().validate().is_ok());

        let bad_step = DaySchedule {
            slot_minutes: 50,
            ..DaySchedule::default()
        };
        assert!(bad_step.validate().is_err());

        let too_long = DaySchedule {
            slot_minutes: 135,
            ..DaySchedule::default()
        };
        assert!(too_long.validate().is_err());

        let inverted = DaySchedule {
            start_of_day: t("17:00"),
            end_of_day: t("09:00"),
            ..DaySchedule::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn booking_serde_round_trip() {
        let booking = Booking {
            id: Ulid::new(),
            room_id: "room-a".into(),
            room_name: "Room A".into(),
            date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            range: "09:00 - 10:00".parse().unwrap(),
            title: "Standup".into(),
            user_name: "Kim".into(),
            user_email: "kim@example.com".into(),
        };
        let json = serde_json::to_string(&booking).unwrap();
        // Range serializes as the external label form
        assert!(json.contains("\"09:00 - 10:00\""));
        let back: Booking = serde_json::from_str(&json).unwrap();
        assert_eq!(back, booking);
        assert_eq!(booking.time_label(), "09:00 - 10:00");
    }
}
