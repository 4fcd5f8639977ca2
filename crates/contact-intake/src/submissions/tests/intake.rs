use std::sync::Arc;

use super::common::*;
use crate::submissions::domain::{ContactForm, RequestMetadata, SubmissionStatus};
use crate::submissions::notify::{ACKNOWLEDGMENT_SUBJECT, ADMIN_SUBJECT};
use crate::submissions::store::{InMemorySubmissionStore, SubmissionStore};
use crate::submissions::{StoreError, SubmissionError, SubmissionService};

#[tokio::test]
async fn submit_stores_sanitized_record_and_notifies_both_parties() {
    let (service, store, mailer) = build_service();
    let form = ContactForm {
        name: Some("  <b>Jane</b> ".to_string()),
        email: Some("jane@example.com ".to_string()),
        phone: Some("<script>alert(1)</script>".to_string()),
        company: Some("ACME>".to_string()),
        message: Some("Hello & welcome".to_string()),
    };
    let metadata = RequestMetadata {
        ip_address: Some("198.51.100.7".to_string()),
        user_agent: Some("Mozilla/5.0".to_string()),
    };

    let receipt = service.submit(form, metadata).expect("submission accepted");
    let report = receipt.notification.await.expect("notification task joins");

    let stored = store
        .get(&receipt.submission.key())
        .expect("get")
        .expect("record persisted");
    assert_eq!(stored.name, "Jane");
    assert_eq!(stored.email, "jane@example.com");
    assert_eq!(stored.phone, "alert(1)");
    assert_eq!(stored.company, "ACME&gt;");
    assert_eq!(stored.message, "Hello &amp; welcome");
    assert_eq!(stored.status, SubmissionStatus::New);
    assert_eq!(stored.ip_address, "198.51.100.7");
    assert_eq!(stored.user_agent, "Mozilla/5.0");

    assert!(report.admin_sent);
    assert!(report.acknowledgment_sent);
    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].subject, ADMIN_SUBJECT);
    assert_eq!(sent[0].to, ADMIN_EMAIL);
    assert!(sent[0].text.contains(&stored.id.0));
    assert_eq!(sent[1].subject, ACKNOWLEDGMENT_SUBJECT);
    assert_eq!(sent[1].to, "jane@example.com");
}

#[tokio::test]
async fn submit_rejects_invalid_forms_without_storing_or_notifying() {
    let (service, store, mailer) = build_service();
    let form = ContactForm {
        email: Some("x@y.com".to_string()),
        message: Some("hi".to_string()),
        ..ContactForm::default()
    };

    match service.submit(form, RequestMetadata::default()) {
        Err(SubmissionError::Validation(errors)) => {
            assert_eq!(errors.0.len(), 1);
            assert_eq!(
                errors.0.get("name").map(String::as_str),
                Some("Name is required")
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert!(store.is_empty());
    tokio::task::yield_now().await;
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_submission() {
    let store = Arc::new(InMemorySubmissionStore::default());
    let service =
        SubmissionService::new(Arc::clone(&store), dispatcher(Arc::new(RejectingMailer)));

    let receipt = service
        .submit(contact_form(), RequestMetadata::default())
        .expect("stored despite mail outage");
    let report = receipt.notification.await.expect("notification task joins");

    assert!(!report.admin_sent);
    assert!(!report.acknowledgment_sent);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn store_failure_surfaces_and_skips_notifications() {
    let service = unavailable_service();

    match service.submit(contact_form(), RequestMetadata::default()) {
        Err(SubmissionError::Store(StoreError::Unavailable(_))) => {}
        other => panic!("expected store failure, got {other:?}"),
    }
}

#[tokio::test]
async fn every_submission_gets_a_fresh_key() {
    let (service, store, _) = build_service();

    let first = service
        .submit(contact_form(), RequestMetadata::default())
        .expect("first");
    let second = service
        .submit(contact_form(), RequestMetadata::default())
        .expect("second");

    assert_ne!(first.submission.id, second.submission.id);
    assert_eq!(store.len(), 2);
}
