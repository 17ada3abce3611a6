use chrono::NaiveDate;

use crate::limits::*;
use crate::model::*;

use super::EngineError;

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| EngineError::validation(field, format!("invalid date {s:?}, expected YYYY-MM-DD")))
}

pub(crate) fn parse_time(field: &'static str, s: &str) -> Result<TimeOfDay, EngineError> {
    s.parse()
        .map_err(|message| EngineError::Validation { field, message })
}

pub(crate) fn validate_room_id(id: &str) -> Result<(), EngineError> {
    if id.is_empty() {
        return Err(EngineError::validation("room_id", "must not be empty"));
    }
    if id.len() > MAX_ROOM_ID_LEN {
        return Err(EngineError::validation("room_id", "too long"));
    }
    Ok(())
}

pub(crate) fn validate_room(room: &Room) -> Result<(), EngineError> {
    validate_room_id(&room.id)?;
    if room.name.is_empty() || room.name.len() > MAX_ROOM_NAME_LEN {
        return Err(EngineError::validation("room_name", "must be 1..=120 characters"));
    }
    if room.capacity == 0 {
        return Err(EngineError::validation("capacity", "must be positive"));
    }
    Ok(())
}

/// Field checks for booking details. Runs before any store access, so a
/// rejected request has no side effects.
pub(crate) fn validate_details(
    title: &str,
    user_name: &str,
    user_email: &str,
) -> Result<(), EngineError> {
    if title.is_empty() || title.len() > MAX_TITLE_LEN {
        return Err(EngineError::validation("title", "must be 1..=200 characters"));
    }
    if user_name.is_empty() || user_name.len() > MAX_USER_NAME_LEN {
        return Err(EngineError::validation("user_name", "must be 1..=100 characters"));
    }
    if user_email.len() > MAX_EMAIL_LEN || !plausible_email(user_email) {
        return Err(EngineError::validation("user_email", format!("{user_email:?} is not a valid address")));
    }
    Ok(())
}

/// Structural email check only — deliverability is not this crate's problem.
fn plausible_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(|c| c.is_whitespace())
}

/// The contiguous-chain walk.
///
/// Starting at `start`, require a free slot beginning exactly at the
/// cursor, advance to that slot's end, and repeat until the cursor lands
/// exactly on `end`. A raw overlap test against the merged range cannot
/// prove the range is made of whole atomic slots with no gaps; the walk
/// can. Any miss or overshoot means unavailable-or-misaligned.
pub(crate) fn range_is_free(free: &[TimeRange], start: TimeOfDay, end: TimeOfDay) -> bool {
    let mut cursor = start;
    while cursor < end {
        match free.iter().find(|s| s.start == cursor) {
            Some(slot) => cursor = slot.end,
            None => return false,
        }
    }
    cursor == end
}
