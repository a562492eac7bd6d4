pub mod events;
pub mod notifications;
pub mod shared;
pub mod shifts;
pub mod swaps;
pub mod time_logs;
pub mod time_off;
pub mod users;
