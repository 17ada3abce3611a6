use chrono::NaiveDate;
use ulid::Ulid;

use crate::model::TimeRange;

#[derive(Debug)]
pub enum EngineError {
    /// Malformed input, rejected before any store access.
    Validation {
        field: &'static str,
        message: String,
    },
    /// Unknown room id.
    NotFound(String),
    AlreadyExists(String),
    BookingNotFound(Ulid),
    /// Caller is neither an admin nor the booking's owner.
    Forbidden(Ulid),
    /// The requested range is not fully free, or does not align to the
    /// slot grid in effect at reservation time. Callers refresh and retry.
    Conflict {
        room_id: String,
        date: NaiveDate,
        range: TimeRange,
    },
    Storage(String),
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation { field, message } => {
                write!(f, "invalid {field}: {message}")
            }
            EngineError::NotFound(room_id) => write!(f, "room not found: {room_id}"),
            EngineError::AlreadyExists(room_id) => write!(f, "room already exists: {room_id}"),
            EngineError::BookingNotFound(id) => write!(f, "booking not found: {id}"),
            EngineError::Forbidden(id) => write!(f, "not permitted to modify booking {id}"),
            EngineError::Conflict {
                room_id,
                date,
                range,
            } => {
                write!(
                    f,
                    "range {range} on {date} for room {room_id} is unavailable or misaligned"
                )
            }
            EngineError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<super::store::StoreError> for EngineError {
    fn from(e: super::store::StoreError) -> Self {
        EngineError::Storage(e.0)
    }
}
