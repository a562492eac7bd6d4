use std::sync::Arc;

use sqlx::SqlitePool;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::AppError;

use database::repositories::{
    NotificationRepository, ShiftRepository, ShiftSwapRepository, TimeLogRepository,
    TimeOffRepository, UserRepository,
};
use services::{
    ApprovalWorkflow, AuthService, ChangeFeed, NotificationFanout, NotificationInbox,
    PushTransport, ShiftStore, TimeClock, UserDirectory,
};

/// Services shared by every worker.
pub struct AppState {
    pub auth_service: AuthService,
    pub shift_store: ShiftStore,
    pub approvals: ApprovalWorkflow,
    pub time_clock: TimeClock,
    pub fanout: NotificationFanout,
    pub inbox: NotificationInbox,
    pub directory: UserDirectory,
    pub feed: ChangeFeed,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config, push: Arc<dyn PushTransport>) -> Self {
        let feed = ChangeFeed::new(config.event_channel_capacity);

        let users = UserRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool.clone());
        let shifts = ShiftRepository::new(pool.clone());
        let swaps = ShiftSwapRepository::new(pool.clone());
        let time_off = TimeOffRepository::new(pool.clone());
        let time_logs = TimeLogRepository::new(pool);

        let fanout =
            NotificationFanout::new(users.clone(), notifications.clone(), push, feed.clone());

        Self {
            auth_service: AuthService::new(config.clone()),
            shift_store: ShiftStore::new(
                shifts.clone(),
                swaps.clone(),
                fanout.clone(),
                feed.clone(),
            ),
            time_clock: TimeClock::new(time_logs, shifts.clone(), feed.clone()),
            approvals: ApprovalWorkflow::new(time_off, swaps, shifts, fanout.clone(), feed.clone()),
            inbox: NotificationInbox::new(notifications, feed.clone()),
            directory: UserDirectory::new(users),
            fanout,
            feed,
        }
    }
}
