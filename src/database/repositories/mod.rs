pub mod notification;
pub mod shift;
pub mod shift_swap;
pub mod time_log;
pub mod time_off;
pub mod user;

// Re-export all repositories for easy importing
pub use notification::NotificationRepository;
pub use shift::ShiftRepository;
pub use shift_swap::ShiftSwapRepository;
pub use time_log::TimeLogRepository;
pub use time_off::TimeOffRepository;
pub use user::UserRepository;
