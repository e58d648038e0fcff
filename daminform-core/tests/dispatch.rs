mod support;

use daminform_core::{DispatchOptions, Dispatcher};
use std::sync::Arc;
use support::{FakeMailer, FakeQueue, FakeState, NullAudit, queue_entry};

fn options() -> DispatchOptions {
    DispatchOptions {
        from: "noreply@ahs.ca".to_string(),
        domain: "ahs.ca".to_string(),
        subject_prefix: "DAM: ".to_string(),
        manager_addresses: vec!["mgr@x.com".to_string()],
    }
}

fn dispatcher(
    state: Arc<FakeState>,
    queue: Arc<FakeQueue>,
    mailer: Arc<FakeMailer>,
) -> Dispatcher {
    Dispatcher::new(state, queue, mailer, Arc::new(NullAudit), options())
}

#[tokio::test]
async fn test_dispatch_sends_in_ascending_id_order() {
    let state = Arc::new(FakeState::new(Some(4)));
    let queue = Arc::new(FakeQueue::new(vec![
        queue_entry(7, "carol", "DAM-7", false),
        queue_entry(5, "alice", "DAM-5", false),
        queue_entry(3, "stale", "DAM-3", false),
        queue_entry(6, "bob", "DAM-6", false),
    ]));
    let mailer = Arc::new(FakeMailer::new());

    let outcome = dispatcher(state.clone(), queue, mailer.clone())
        .dispatch()
        .await
        .unwrap();

    let recipients: Vec<String> =
        mailer.sent().into_iter().map(|m| m.to).collect();
    assert_eq!(recipients, vec!["alice@ahs.ca", "bob@ahs.ca", "carol@ahs.ca"]);
    assert_eq!(outcome.scanned, 3);
    assert_eq!(outcome.sent, 3);
    assert!(outcome.is_complete());
    assert_eq!(state.cursor(), Some(7));
}

#[tokio::test]
async fn test_cursor_never_regresses() {
    let state = Arc::new(FakeState::new(Some(42)));
    let queue = Arc::new(FakeQueue::new(vec![queue_entry(
        10, "old", "DAM-10", false,
    )]));
    let mailer = Arc::new(FakeMailer::new());

    let outcome = dispatcher(state.clone(), queue, mailer.clone())
        .dispatch()
        .await
        .unwrap();

    assert_eq!(outcome.scanned, 0);
    assert!(mailer.sent().is_empty());
    assert_eq!(state.cursor(), Some(42));
}

#[tokio::test]
async fn test_failed_send_stops_run_and_is_retried() {
    let state = Arc::new(FakeState::new(Some(4)));
    let queue = Arc::new(FakeQueue::new(vec![
        queue_entry(5, "alice", "DAM-5", false),
        queue_entry(6, "bounce", "DAM-6", false),
        queue_entry(7, "carol", "DAM-7", false),
    ]));

    let mailer = Arc::new(FakeMailer::failing_for("bounce@ahs.ca"));
    let outcome = dispatcher(state.clone(), queue.clone(), mailer.clone())
        .dispatch()
        .await
        .unwrap();

    // The run stops at the failure; the failed entry is not skipped.
    assert_eq!(outcome.sent, 1);
    assert_eq!(outcome.failed, Some(6));
    assert!(!outcome.is_complete());
    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(state.cursor(), Some(5));

    // Next run with a healthy transport picks up at the failed entry.
    let retry_mailer = Arc::new(FakeMailer::new());
    let outcome = dispatcher(state.clone(), queue, retry_mailer.clone())
        .dispatch()
        .await
        .unwrap();

    let recipients: Vec<String> =
        retry_mailer.sent().into_iter().map(|m| m.to).collect();
    assert_eq!(recipients, vec!["bounce@ahs.ca", "carol@ahs.ca"]);
    assert_eq!(outcome.sent, 2);
    assert_eq!(state.cursor(), Some(7));
}

#[tokio::test]
async fn test_absent_state_row_dispatches_nothing() {
    let state = Arc::new(FakeState::new(None));
    let queue = Arc::new(FakeQueue::new(vec![queue_entry(
        1, "alice", "DAM-1", false,
    )]));
    let mailer = Arc::new(FakeMailer::new());

    let outcome = dispatcher(state.clone(), queue, mailer.clone())
        .dispatch()
        .await
        .unwrap();

    assert_eq!(outcome.scanned, 0);
    assert!(mailer.sent().is_empty());
    assert_eq!(state.cursor(), None);
}

#[tokio::test]
async fn test_manager_flag_copies_manager_addresses() {
    let state = Arc::new(FakeState::new(Some(9)));
    let queue = Arc::new(FakeQueue::new(vec![queue_entry(
        10, "jdoe", "DAM-1", true,
    )]));
    let mailer = Arc::new(FakeMailer::new());

    let outcome = dispatcher(state.clone(), queue, mailer.clone())
        .dispatch()
        .await
        .unwrap();

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jdoe@ahs.ca");
    assert_eq!(sent[0].cc, vec!["mgr@x.com".to_string()]);
    assert!(sent[0].subject.contains("DAM-1"));
    assert_eq!(outcome.cursor, Some(10));
    assert_eq!(state.cursor(), Some(10));
}

#[tokio::test]
async fn test_unflagged_entry_has_no_cc() {
    let state = Arc::new(FakeState::new(Some(0)));
    let queue = Arc::new(FakeQueue::new(vec![queue_entry(
        1, "jdoe", "DAM-2", false,
    )]));
    let mailer = Arc::new(FakeMailer::new());

    dispatcher(state, queue, mailer.clone()).dispatch().await.unwrap();

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].cc.is_empty());
}
