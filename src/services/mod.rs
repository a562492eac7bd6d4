pub mod approval;
pub mod auth;
pub mod change_feed;
pub mod inbox;
pub mod notification_fanout;
pub mod push;
pub mod shift_store;
pub mod time_clock;
pub mod user_context;
pub mod user_directory;

pub use approval::{ApprovalWorkflow, SwapReview};
pub use auth::{AuthService, Claims};
pub use change_feed::{ChangeEvent, ChangeFeed, ChangeSubscription};
pub use inbox::NotificationInbox;
pub use notification_fanout::NotificationFanout;
pub use push::{LogPushTransport, PushMessage, PushTransport};
pub use shift_store::ShiftStore;
pub use time_clock::TimeClock;
pub use user_context::RequestContext;
pub use user_directory::UserDirectory;
