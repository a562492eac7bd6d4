pub(crate) mod macros;

pub mod notification;
pub mod shift;
pub mod swap;
pub mod time_log;
pub mod time_off;
pub mod user;

// Re-export all models for easy importing
pub use notification::*;
pub use shift::*;
pub use swap::*;
pub use time_log::*;
pub use time_off::*;
pub use user::*;
