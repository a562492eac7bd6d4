use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use shiftbook::database::models::{
    Recurrence, RecurrenceFrequency, ShiftFilter, ShiftStatus, ShiftSwapInput, UserRole,
};
use shiftbook::error::AppError;

mod common;

use common::{TestContext, at, employee, manager, shift_input};

async fn setup() -> TestContext {
    let ctx = TestContext::new().await.unwrap();
    ctx.seed_user("mgr-1", UserRole::Manager, None).await;
    ctx.seed_user("emp-1", UserRole::Employee, Some("Front")).await;
    ctx.seed_user("emp-2", UserRole::Employee, Some("Front")).await;
    ctx
}

#[actix_rt::test]
async fn test_employee_created_shift_is_pending() {
    let ctx = setup().await;
    let mut input = shift_input("emp-1", at(2024, 6, 3, 9), 8);
    input.status = Some(ShiftStatus::Scheduled);

    let shift = ctx
        .state
        .shift_store
        .create_shift(&employee("emp-1"), input)
        .await
        .unwrap();

    assert_eq!(shift.status, ShiftStatus::Pending);
    assert_eq!(shift.employee_id, "emp-1");
    // Own shift, so no assignment notification
    assert_eq!(ctx.unread_for("emp-1").await, 0);
}

#[actix_rt::test]
async fn test_employee_cannot_create_shift_for_someone_else() {
    let ctx = setup().await;

    let result = ctx
        .state
        .shift_store
        .create_shift(&employee("emp-1"), shift_input("emp-2", at(2024, 6, 3, 9), 8))
        .await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[actix_rt::test]
async fn test_manager_created_shift_notifies_assignee() {
    let ctx = setup().await;

    let shift = ctx
        .state
        .shift_store
        .create_shift(&manager("mgr-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();

    assert_eq!(shift.status, ShiftStatus::Scheduled);
    assert_eq!(ctx.unread_for("emp-1").await, 1);
}

#[actix_rt::test]
async fn test_replayed_create_returns_stored_shift() {
    let ctx = setup().await;
    let mut input = shift_input("emp-1", at(2024, 6, 3, 9), 8);
    input.id = Some(Uuid::new_v4());

    let first = ctx
        .state
        .shift_store
        .create_shift(&manager("mgr-1"), input.clone())
        .await
        .unwrap();
    let second = ctx
        .state
        .shift_store
        .create_shift(&manager("mgr-1"), input)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        ctx.state
            .shift_store
            .list_by_employee(&employee("emp-1"), "emp-1")
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(ctx.unread_for("emp-1").await, 1);
}

#[actix_rt::test]
async fn test_reused_id_for_different_shift_conflicts() {
    let ctx = setup().await;
    let id = Uuid::new_v4();
    let mut input = shift_input("emp-1", at(2024, 6, 3, 9), 8);
    input.id = Some(id);
    ctx.state
        .shift_store
        .create_shift(&manager("mgr-1"), input.clone())
        .await
        .unwrap();

    input.start_time = at(2024, 6, 4, 9);
    input.end_time = at(2024, 6, 4, 17);
    let result = ctx.state.shift_store.create_shift(&manager("mgr-1"), input).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[actix_rt::test]
async fn test_shift_must_end_after_start() {
    let ctx = setup().await;
    let mut input = shift_input("emp-1", at(2024, 6, 3, 9), 8);
    input.end_time = input.start_time;

    let result = ctx.state.shift_store.create_shift(&manager("mgr-1"), input).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[actix_rt::test]
async fn test_cancelled_shift_cannot_be_approved() {
    let ctx = setup().await;
    let store = &ctx.state.shift_store;
    let shift = store
        .create_shift(&manager("mgr-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();

    store
        .update_status(&manager("mgr-1"), shift.id, ShiftStatus::Cancelled)
        .await
        .unwrap();
    let result = store
        .update_status(&manager("mgr-1"), shift.id, ShiftStatus::Approved)
        .await;

    assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    let stored = store.get_shift(&manager("mgr-1"), shift.id).await.unwrap();
    assert_eq!(stored.status, ShiftStatus::Cancelled);
}

#[actix_rt::test]
async fn test_same_status_update_is_a_no_op() {
    let ctx = setup().await;
    let store = &ctx.state.shift_store;
    let shift = store
        .create_shift(&manager("mgr-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();
    let before = ctx.unread_for("emp-1").await;

    let unchanged = store
        .update_status(&manager("mgr-1"), shift.id, ShiftStatus::Scheduled)
        .await
        .unwrap();

    assert_eq!(unchanged, shift);
    assert_eq!(ctx.unread_for("emp-1").await, before);
}

#[actix_rt::test]
async fn test_status_change_notifies_employee() {
    let ctx = setup().await;
    let store = &ctx.state.shift_store;
    let shift = store
        .create_shift(&employee("emp-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();

    let approved = store
        .update_status(&manager("mgr-1"), shift.id, ShiftStatus::Approved)
        .await
        .unwrap();

    assert_eq!(approved.status, ShiftStatus::Approved);
    let inbox = ctx
        .state
        .inbox
        .list(&employee("emp-1"), true, None)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, "Shift updated");
}

#[actix_rt::test]
async fn test_concurrent_identical_status_updates_both_succeed() {
    let ctx = setup().await;
    let store = &ctx.state.shift_store;
    let shift = store
        .create_shift(&employee("emp-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();
    let mgr = manager("mgr-1");

    let (first, second) = tokio::join!(
        store.update_status(&mgr, shift.id, ShiftStatus::Approved),
        store.update_status(&mgr, shift.id, ShiftStatus::Approved),
    );

    assert_eq!(first.unwrap().status, ShiftStatus::Approved);
    assert_eq!(second.unwrap().status, ShiftStatus::Approved);
    assert_eq!(ctx.unread_for("emp-1").await, 1);
}

#[actix_rt::test]
async fn test_employee_can_only_start_or_complete_own_shift() {
    let ctx = setup().await;
    let store = &ctx.state.shift_store;
    let shift = store
        .create_shift(&manager("mgr-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();

    let cancel = store
        .update_status(&employee("emp-1"), shift.id, ShiftStatus::Cancelled)
        .await;
    assert!(matches!(cancel, Err(AppError::Unauthorized(_))));

    let other = store
        .update_status(&employee("emp-2"), shift.id, ShiftStatus::InProgress)
        .await;
    assert!(matches!(other, Err(AppError::Unauthorized(_))));

    let started = store
        .update_status(&employee("emp-1"), shift.id, ShiftStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(started.status, ShiftStatus::InProgress);
}

#[actix_rt::test]
async fn test_list_shifts_filters_by_status_and_window() {
    let ctx = setup().await;
    let store = &ctx.state.shift_store;
    let mgr = manager("mgr-1");
    let early = store
        .create_shift(&mgr, shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();
    let late = store
        .create_shift(&mgr, shift_input("emp-2", at(2024, 6, 10, 9), 8))
        .await
        .unwrap();
    store
        .update_status(&mgr, late.id, ShiftStatus::Cancelled)
        .await
        .unwrap();

    let scheduled = store
        .list_shifts(
            &mgr,
            &ShiftFilter {
                status: Some(ShiftStatus::Scheduled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(scheduled.iter().map(|s| s.id).collect::<Vec<_>>(), vec![early.id]);

    let week_two = store
        .list_shifts(
            &mgr,
            &ShiftFilter {
                status: None,
                from: Some(at(2024, 6, 8, 0)),
                to: Some(at(2024, 6, 15, 0)),
            },
        )
        .await
        .unwrap();
    assert_eq!(week_two.iter().map(|s| s.id).collect::<Vec<_>>(), vec![late.id]);

    let denied = store
        .list_shifts(&employee("emp-1"), &ShiftFilter::default())
        .await;
    assert!(matches!(denied, Err(AppError::Unauthorized(_))));
}

#[actix_rt::test]
async fn test_employee_cannot_read_another_employees_shifts() {
    let ctx = setup().await;
    let shift = ctx
        .state
        .shift_store
        .create_shift(&manager("mgr-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();

    let get = ctx.state.shift_store.get_shift(&employee("emp-2"), shift.id).await;
    let list = ctx
        .state
        .shift_store
        .list_by_employee(&employee("emp-2"), "emp-1")
        .await;

    assert!(matches!(get, Err(AppError::Unauthorized(_))));
    assert!(matches!(list, Err(AppError::Unauthorized(_))));
}

#[actix_rt::test]
async fn test_missing_shift_is_not_found() {
    let ctx = setup().await;

    let result = ctx
        .state
        .shift_store
        .get_shift(&manager("mgr-1"), Uuid::new_v4())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn test_delete_blocked_while_swap_pending() {
    let ctx = setup().await;
    let store = &ctx.state.shift_store;
    let shift = store
        .create_shift(&manager("mgr-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();
    let swap = ctx
        .state
        .approvals
        .request_swap(
            &employee("emp-1"),
            ShiftSwapInput {
                original_shift_id: shift.id,
                original_employee_id: None,
                new_employee_id: "emp-2".to_string(),
            },
        )
        .await
        .unwrap();

    let blocked = store.delete_shift(&manager("mgr-1"), shift.id).await;
    assert!(matches!(blocked, Err(AppError::Conflict(_))));

    ctx.state
        .approvals
        .review_swap(
            &manager("mgr-1"),
            swap.id,
            shiftbook::database::models::Decision::Reject,
            None,
        )
        .await
        .unwrap();
    store.delete_shift(&manager("mgr-1"), shift.id).await.unwrap();

    let gone = store.get_shift(&manager("mgr-1"), shift.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn test_employees_cannot_delete_shifts() {
    let ctx = setup().await;
    let shift = ctx
        .state
        .shift_store
        .create_shift(&employee("emp-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();

    let result = ctx
        .state
        .shift_store
        .delete_shift(&employee("emp-1"), shift.id)
        .await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[actix_rt::test]
async fn test_recurring_shift_occurrences() {
    let ctx = setup().await;
    let mut input = shift_input("emp-1", at(2024, 6, 3, 9), 8);
    input.recurrence = Some(Recurrence {
        frequency: RecurrenceFrequency::Weekly,
        interval: 1,
        end_date: NaiveDate::from_ymd_opt(2024, 6, 24),
    });
    let shift = ctx
        .state
        .shift_store
        .create_shift(&manager("mgr-1"), input)
        .await
        .unwrap();

    let occurrences = ctx
        .state
        .shift_store
        .occurrences(&employee("emp-1"), shift.id, None)
        .await
        .unwrap();

    let starts: Vec<_> = occurrences.iter().map(|o| o.start_time).collect();
    assert_eq!(
        starts,
        vec![
            at(2024, 6, 3, 9),
            at(2024, 6, 10, 9),
            at(2024, 6, 17, 9),
            at(2024, 6, 24, 9)
        ]
    );
    assert_eq!(shift.recurrence.unwrap().frequency, RecurrenceFrequency::Weekly);
}

#[actix_rt::test]
async fn test_one_off_shift_has_single_occurrence() {
    let ctx = setup().await;
    let shift = ctx
        .state
        .shift_store
        .create_shift(&manager("mgr-1"), shift_input("emp-1", at(2024, 6, 3, 9), 8))
        .await
        .unwrap();

    let occurrences = ctx
        .state
        .shift_store
        .occurrences(&manager("mgr-1"), shift.id, Some(10))
        .await
        .unwrap();

    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].end_time, at(2024, 6, 3, 17));
}

#[actix_rt::test]
async fn test_zero_interval_recurrence_rejected() {
    let ctx = setup().await;
    let mut input = shift_input("emp-1", at(2024, 6, 3, 9), 8);
    input.recurrence = Some(Recurrence {
        frequency: RecurrenceFrequency::Daily,
        interval: 0,
        end_date: None,
    });

    let result = ctx.state.shift_store.create_shift(&manager("mgr-1"), input).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}
