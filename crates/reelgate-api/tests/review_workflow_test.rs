//! End-to-end review workflow scenarios at the service level.

mod helpers;

use std::time::Duration;

use helpers::{setup_observed_app, setup_test_app};
use reelgate_api::services::notify::NotifyEvent;
use reelgate_core::{AppError, MediaType, UploadStatus};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

async fn next_event(events: &mut UnboundedReceiver<NotifyEvent>) -> NotifyEvent {
    tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("timed out waiting for a notification")
        .expect("notification channel closed")
}

#[tokio::test]
async fn submitted_movie_lands_in_pending_area() {
    let app = setup_test_app().await;

    let upload = app
        .state
        .review
        .submit("Movie.mkv", MediaType::Movie, "fan@example.com", b"film bytes")
        .await
        .unwrap();

    assert_eq!(upload.status, UploadStatus::Pending);
    assert_eq!(upload.original_name, "Movie.mkv");
    assert_eq!(upload.stored_name, format!("{}_Movie.mkv", upload.id));
    assert_eq!(upload.size_bytes, 10);

    let pending_path = app
        .state
        .config
        .pending_dir(MediaType::Movie)
        .join(&upload.stored_name);
    assert_eq!(std::fs::read(&pending_path).unwrap(), b"film bytes");
}

#[tokio::test]
async fn approval_publishes_the_file() {
    let app = setup_test_app().await;
    let upload = app
        .state
        .review
        .submit("Movie.mkv", MediaType::Movie, "fan@example.com", b"film bytes")
        .await
        .unwrap();

    let approved = app.state.review.approve(upload.id).await.unwrap();
    assert_eq!(approved.status, UploadStatus::Approved);
    assert!(approved.reviewed_at.is_some());

    let pending_path = app
        .state
        .config
        .pending_dir(MediaType::Movie)
        .join(&upload.stored_name);
    let published_path = app
        .state
        .config
        .published_dir(MediaType::Movie)
        .join(&upload.original_name);

    assert!(!pending_path.exists());
    assert_eq!(std::fs::read(&published_path).unwrap(), b"film bytes");
}

#[tokio::test]
async fn denial_deletes_the_file_and_keeps_notes() {
    let app = setup_test_app().await;
    let upload = app
        .state
        .review
        .submit("Show.mkv", MediaType::Series, "fan@example.com", b"episode")
        .await
        .unwrap();

    let denied = app
        .state
        .review
        .deny(upload.id, Some("wrong season order".to_string()))
        .await
        .unwrap();

    assert_eq!(denied.status, UploadStatus::Denied);
    assert_eq!(denied.review_notes.as_deref(), Some("wrong season order"));

    let pending_path = app
        .state
        .config
        .pending_dir(MediaType::Series)
        .join(&upload.stored_name);
    assert!(!pending_path.exists());
    // nothing was published
    let published_dir = app.state.config.published_dir(MediaType::Series);
    assert_eq!(std::fs::read_dir(published_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn rejected_extension_writes_nothing() {
    let app = setup_test_app().await;

    let err = app
        .state
        .review
        .submit("notes.txt", MediaType::Movie, "fan@example.com", b"text")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let pending_dir = app.state.config.pending_dir(MediaType::Movie);
    assert_eq!(std::fs::read_dir(pending_dir).unwrap().count(), 0);
    assert!(app.state.uploads.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_file_is_rejected() {
    let app = setup_test_app().await;

    let err = app
        .state
        .review
        .submit("Movie.mkv", MediaType::Movie, "fan@example.com", b"")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn second_review_gets_conflict_and_first_outcome_stands() {
    let app = setup_test_app().await;
    let upload = app
        .state
        .review
        .submit("Movie.mkv", MediaType::Movie, "fan@example.com", b"film bytes")
        .await
        .unwrap();

    app.state.review.approve(upload.id).await.unwrap();

    let err = app.state.review.deny(upload.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyReviewed(_)));

    let fetched = app.state.uploads.get(upload.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, UploadStatus::Approved);

    // the published file was not disturbed by the failed denial
    let published_path = app
        .state
        .config
        .published_dir(MediaType::Movie)
        .join(&upload.original_name);
    assert!(published_path.exists());
}

#[tokio::test]
async fn conflicting_review_sends_no_notification() {
    let (app, mut events) = setup_observed_app().await;
    let upload = app
        .state
        .review
        .submit("Movie.mkv", MediaType::Movie, "fan@example.com", b"film bytes")
        .await
        .unwrap();

    app.state.review.approve(upload.id).await.unwrap();

    // the submit and the approval each dispatch exactly once
    assert_eq!(next_event(&mut events).await, NotifyEvent::Received);
    assert_eq!(next_event(&mut events).await, NotifyEvent::Approved);

    let err = app.state.review.deny(upload.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyReviewed(_)));
    let err = app.state.review.approve(upload.id).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyReviewed(_)));

    // leave room for any stray spawned dispatch before checking
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn approve_with_missing_file_leaves_upload_pending() {
    let app = setup_test_app().await;
    let upload = app
        .state
        .review
        .submit("Movie.mkv", MediaType::Movie, "fan@example.com", b"film bytes")
        .await
        .unwrap();

    let pending_path = app
        .state
        .config
        .pending_dir(MediaType::Movie)
        .join(&upload.stored_name);
    std::fs::remove_file(&pending_path).unwrap();

    let err = app.state.review.approve(upload.id).await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));

    // still pending, so the action can be retried once the file is restored
    let fetched = app.state.uploads.get(upload.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, UploadStatus::Pending);
}

#[tokio::test]
async fn deny_with_missing_file_still_succeeds() {
    let app = setup_test_app().await;
    let upload = app
        .state
        .review
        .submit("Movie.mkv", MediaType::Movie, "fan@example.com", b"film bytes")
        .await
        .unwrap();

    let pending_path = app
        .state
        .config
        .pending_dir(MediaType::Movie)
        .join(&upload.stored_name);
    std::fs::remove_file(&pending_path).unwrap();

    let denied = app.state.review.deny(upload.id, None).await.unwrap();
    assert_eq!(denied.status, UploadStatus::Denied);
}

#[tokio::test]
async fn review_actions_on_unknown_id_are_not_found() {
    let app = setup_test_app().await;

    let err = app.state.review.approve(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = app
        .state
        .review
        .deny(Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn blank_denial_notes_are_dropped() {
    let app = setup_test_app().await;
    let upload = app
        .state
        .review
        .submit("Movie.mkv", MediaType::Movie, "fan@example.com", b"film bytes")
        .await
        .unwrap();

    let denied = app
        .state
        .review
        .deny(upload.id, Some("   ".to_string()))
        .await
        .unwrap();
    assert_eq!(denied.review_notes, None);
}
