use pretty_assertions::assert_eq;
use uuid::Uuid;

use shiftbook::database::models::{
    NotificationEvent, NotificationTarget, NotificationType, UserRole,
};
use shiftbook::error::AppError;
use shiftbook::services::ChangeEvent;

mod common;

use common::{TestContext, employee, manager};

async fn setup() -> TestContext {
    let ctx = TestContext::new().await.unwrap();
    ctx.seed_user("mgr-1", UserRole::Manager, Some("Kitchen")).await;
    ctx.seed_user("mgr-2", UserRole::Manager, Some("Floor")).await;
    ctx.seed_user("emp-1", UserRole::Employee, Some("Kitchen")).await;
    ctx.seed_user("emp-2", UserRole::Employee, Some("Floor")).await;
    ctx
}

fn event(target: NotificationTarget) -> NotificationEvent {
    NotificationEvent::new(target, "Heads up", "Inventory tonight", NotificationType::Info)
}

fn recipients(report: &shiftbook::database::models::FanoutReport) -> Vec<String> {
    let mut ids: Vec<_> = report
        .notifications
        .iter()
        .map(|n| n.user_id.clone())
        .collect();
    ids.sort();
    ids
}

#[actix_rt::test]
async fn test_role_target_reaches_only_active_users_with_role() {
    let ctx = setup().await;
    ctx.deactivate("mgr-2").await;

    let report = ctx
        .state
        .fanout
        .fanout(&event(NotificationTarget::Role(UserRole::Manager)))
        .await
        .unwrap();

    assert_eq!(recipients(&report), vec!["mgr-1".to_string()]);
    assert_eq!(ctx.unread_for("mgr-2").await, 0);
}

#[actix_rt::test]
async fn test_department_and_all_targets() {
    let ctx = setup().await;
    ctx.deactivate("emp-2").await;

    let kitchen = ctx
        .state
        .fanout
        .fanout(&event(NotificationTarget::Department("Kitchen".to_string())))
        .await
        .unwrap();
    assert_eq!(
        recipients(&kitchen),
        vec!["emp-1".to_string(), "mgr-1".to_string()]
    );

    let everyone = ctx
        .state
        .fanout
        .fanout(&event(NotificationTarget::All))
        .await
        .unwrap();
    assert_eq!(
        recipients(&everyone),
        vec!["emp-1".to_string(), "mgr-1".to_string(), "mgr-2".to_string()]
    );
}

#[actix_rt::test]
async fn test_explicit_users_are_deduplicated() {
    let ctx = setup().await;

    let report = ctx
        .state
        .fanout
        .fanout(&event(NotificationTarget::Users(vec![
            "emp-1".to_string(),
            "emp-2".to_string(),
            "emp-1".to_string(),
            " ".to_string(),
        ])))
        .await
        .unwrap();

    assert_eq!(report.notifications.len(), 2);
    assert_eq!(ctx.unread_for("emp-1").await, 1);
}

#[actix_rt::test]
async fn test_event_key_delivers_at_most_once_per_user() {
    let ctx = setup().await;
    let keyed = event(NotificationTarget::Users(vec!["emp-1".to_string()]))
        .with_event_key("inventory:2024-06-01");

    let first = ctx.state.fanout.fanout(&keyed).await.unwrap();
    let second = ctx.state.fanout.fanout(&keyed).await.unwrap();

    assert_eq!(first.notifications.len(), 1);
    assert!(second.notifications.is_empty());
    assert_eq!(second.skipped_duplicates, vec!["emp-1".to_string()]);
    assert_eq!(ctx.unread_for("emp-1").await, 1);
}

#[actix_rt::test]
async fn test_push_failure_keeps_stored_notification() {
    let ctx = setup().await;
    ctx.register_token("emp-1", "token-emp-1").await;
    ctx.register_token("emp-2", "token-emp-2").await;
    ctx.push.fail_for("token-emp-2");

    let report = ctx
        .state
        .fanout
        .fanout(&event(NotificationTarget::Users(vec![
            "emp-1".to_string(),
            "emp-2".to_string(),
            "mgr-1".to_string(),
        ])))
        .await
        .unwrap();

    assert_eq!(report.notifications.len(), 3);
    assert_eq!(report.push_delivered, 1);
    assert_eq!(report.push_failed, 1);
    assert!(report.failed_recipients.is_empty());
    assert_eq!(ctx.unread_for("emp-2").await, 1);

    let delivered = ctx.push.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, "token-emp-1");
    assert_eq!(delivered[0].1.title, "Heads up");
}

#[actix_rt::test]
async fn test_blank_event_is_rejected() {
    let ctx = setup().await;
    let mut blank = event(NotificationTarget::All);
    blank.title = "  ".to_string();

    let result = ctx.state.fanout.fanout(&blank).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[actix_rt::test]
async fn test_inbox_read_state() {
    let ctx = setup().await;
    let inbox = &ctx.state.inbox;
    for title in ["First", "Second", "Third"] {
        let mut e = event(NotificationTarget::Users(vec!["emp-1".to_string()]));
        e.title = title.to_string();
        ctx.state.fanout.fanout(&e).await.unwrap();
    }

    let all = inbox.list(&employee("emp-1"), false, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let read = inbox.mark_as_read(&employee("emp-1"), all[0].id).await.unwrap();
    assert!(read.read);
    assert_eq!(ctx.unread_for("emp-1").await, 2);

    let unread = inbox.list(&employee("emp-1"), true, None).await.unwrap();
    assert_eq!(unread.len(), 2);
    assert!(unread.iter().all(|n| !n.read));

    let updated = inbox.mark_all_as_read(&employee("emp-1")).await.unwrap();
    assert_eq!(updated, 2);
    assert_eq!(ctx.unread_for("emp-1").await, 0);

    let limited = inbox.list(&employee("emp-1"), false, Some(1)).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[actix_rt::test]
async fn test_inbox_is_private() {
    let ctx = setup().await;
    let report = ctx
        .state
        .fanout
        .fanout(&event(NotificationTarget::Users(vec!["emp-1".to_string()])))
        .await
        .unwrap();
    let id = report.notifications[0].id;

    let read = ctx.state.inbox.mark_as_read(&employee("emp-2"), id).await;
    assert!(matches!(read, Err(AppError::Unauthorized(_))));

    let delete = ctx.state.inbox.delete(&manager("mgr-1"), id).await;
    assert!(matches!(delete, Err(AppError::Unauthorized(_))));

    ctx.state.inbox.delete(&employee("emp-1"), id).await.unwrap();
    let missing = ctx.state.inbox.mark_as_read(&employee("emp-1"), id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let unknown = ctx.state.inbox.delete(&employee("emp-1"), Uuid::new_v4()).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn test_change_feed_carries_new_notifications() {
    let ctx = setup().await;
    let mut subscription = ctx.state.feed.subscribe(employee("emp-1"));

    ctx.state
        .fanout
        .fanout(&event(NotificationTarget::Users(vec![
            "emp-2".to_string(),
            "emp-1".to_string(),
        ])))
        .await
        .unwrap();

    match subscription.recv().await {
        Some(ChangeEvent::NotificationCreated(notification)) => {
            assert_eq!(notification.user_id, "emp-1");
            assert_eq!(notification.notification_type, NotificationType::Info);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
