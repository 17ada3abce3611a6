//! Hard input limits. Everything crossing the engine boundary is checked
//! against these before any store access.

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_USER_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;

pub const MAX_ROOM_ID_LEN: usize = 64;
pub const MAX_ROOM_NAME_LEN: usize = 120;
pub const MAX_ROOMS: usize = 1024;

/// Slot duration must be a multiple of this step.
pub const SLOT_MINUTES_STEP: u16 = 15;
pub const MIN_SLOT_MINUTES: u16 = 15;
pub const MAX_SLOT_MINUTES: u16 = 120;

/// Dashboard occupancy window, counted in working days.
pub const DEFAULT_USAGE_WINDOW_DAYS: usize = 5;
pub const MAX_USAGE_WINDOW_DAYS: usize = 30;
