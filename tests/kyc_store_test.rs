//! Integration tests for the lawyer-side KYC store.

mod common;

use std::time::Duration;

use chrono::NaiveDate;
use common::{rejected, submission, valid_form, ScriptedBackend};
use lawkyc::api::{RequestError, RequestErrorKind};
use lawkyc::models::kyc::{KycStatus, KycStatusReport, SubmissionState};
use lawkyc::services::kyc_store::UPDATE_REQUIRES_REJECTED;
use lawkyc::services::{KycStore, OperationState};
use lawkyc::utils::form_data::PayloadValue;

#[tokio::test]
async fn successful_submit_stores_the_submission() {
    let backend = ScriptedBackend::default();
    backend.submit.push(Ok(submission(41, KycStatus::Pending)));
    let store = KycStore::new(backend);

    let returned = store.submit(&valid_form()).await.unwrap();
    assert_eq!(returned.id, 41);

    let state = store.state().await;
    assert_eq!(state.my_kyc.as_ref().map(|k| k.id), Some(41));
    assert!(state.submit.is_success());
    assert!(!state.submit.is_loading());
    assert_eq!(state.submit.error(), None);
}

#[tokio::test]
async fn submit_sends_backend_field_names() {
    let backend = ScriptedBackend::default();
    backend.submit.push(Ok(submission(1, KycStatus::Pending)));
    let store = KycStore::new(backend);
    store.submit(&valid_form()).await.unwrap();

    let payloads = store.backend().payloads();
    assert_eq!(payloads.len(), 1);
    let payload = &payloads[0];
    assert_eq!(payload.text("full_name"), Some("Ram Kumar"));
    assert_eq!(payload.text("bar_council_number"), Some("NBC-20931"));
    assert_eq!(payload.text("specializations"), Some(r#"["Criminal Law","Family Law"]"#));
    assert_eq!(payload.text("confirm_accuracy"), Some("true"));
    assert_eq!(payload.file_count(), 6);
    assert!(matches!(payload.get("lawyer_license"), Some(PayloadValue::File(f)) if f.file_name == "license.pdf"));
    assert!(payload.get("fullName").is_none());
}

#[tokio::test]
async fn failed_submit_keeps_previous_submission() {
    let backend = ScriptedBackend::default();
    backend.fetch_mine.push(Ok(Some(submission(5, rejected("Blurry license")))));
    backend.submit.push(Err(RequestError::from_response(
        400,
        r#"{"ErrorMessage":{"bar_council_number":["Already registered"]}}"#,
    )));
    let store = KycStore::new(backend);
    store.fetch_mine().await.unwrap();

    let err = store.submit(&valid_form()).await.unwrap_err();
    assert_eq!(err.message, "Already registered");

    let state = store.state().await;
    assert_eq!(state.my_kyc.as_ref().map(|k| k.id), Some(5));
    assert_eq!(state.submit.error(), Some("Already registered"));
    assert!(!state.submit.is_success());
    assert!(!state.submit.is_loading());
}

#[tokio::test]
async fn invalid_form_never_reaches_the_backend() {
    let store = KycStore::new(ScriptedBackend::default());
    let mut form = valid_form();
    form.personal.phone.clear();

    let err = store.submit(&form).await.unwrap_err();
    assert_eq!(err.kind, RequestErrorKind::Validation);
    assert_eq!(err.message, "Phone number is required");
    assert!(store.backend().calls().is_empty());
    assert_eq!(store.state().await.submit.error(), Some("Phone number is required"));
}

#[tokio::test]
async fn fetch_mine_without_submission_is_not_an_error() {
    let backend = ScriptedBackend::default();
    backend.fetch_mine.push(Ok(None));
    let store = KycStore::new(backend);

    assert_eq!(store.fetch_mine().await.unwrap(), None);
    let state = store.state().await;
    assert_eq!(state.my_kyc, None);
    assert_eq!(state.fetch, OperationState::Succeeded(None));
}

#[tokio::test]
async fn update_after_rejection_returns_to_pending() {
    let backend = ScriptedBackend::default();
    backend.fetch_mine.push(Ok(Some(submission(9, rejected("License expired")))));
    backend.update.push(Ok(submission(9, KycStatus::Pending)));
    let store = KycStore::new(backend);

    store.fetch_mine().await.unwrap();
    let updated = store.update(&valid_form()).await.unwrap();
    assert_eq!(updated.status, KycStatus::Pending);

    let state = store.state().await;
    assert_eq!(state.my_kyc.map(|k| k.status), Some(KycStatus::Pending));
    assert!(state.update.is_success());
    assert_eq!(store.backend().count("update"), 1);
}

#[tokio::test]
async fn update_is_refused_unless_rejected() {
    for status in [KycStatus::Pending, KycStatus::Approved] {
        let backend = ScriptedBackend::default();
        backend.fetch_mine.push(Ok(Some(submission(3, status.clone()))));
        let store = KycStore::new(backend);
        store.fetch_mine().await.unwrap();

        let err = store.update(&valid_form()).await.unwrap_err();
        assert_eq!(err.message, UPDATE_REQUIRES_REJECTED);
        assert_eq!(store.backend().count("update"), 0, "update sent while {}", status);
        assert_eq!(store.my_kyc().await.map(|k| k.status), Some(status));
    }
}

#[tokio::test]
async fn backend_rejection_of_update_is_surfaced() {
    let backend = ScriptedBackend::default();
    backend.update.push(Err(RequestError::from_response(
        400,
        r#"{"error":"KYC can only be updated when status is 'rejected'"}"#,
    )));
    let store = KycStore::new(backend);

    let err = store.update(&valid_form()).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    let state = store.state().await;
    assert_eq!(state.update.error(), Some("KYC can only be updated when status is 'rejected'"));
    assert_eq!(state.my_kyc, None);
}

#[tokio::test]
async fn status_report_does_not_touch_my_kyc() {
    let backend = ScriptedBackend::default();
    backend.fetch_mine.push(Ok(Some(submission(2, KycStatus::Pending))));
    backend.status.push(Ok(KycStatusReport {
        id: Some(2),
        state: SubmissionState::Submitted(KycStatus::Approved),
        created_at: None,
        updated_at: None,
    }));
    let store = KycStore::new(backend);
    store.fetch_mine().await.unwrap();
    store.fetch_status().await.unwrap();

    let state = store.state().await;
    assert_eq!(state.my_kyc.map(|k| k.status), Some(KycStatus::Pending));
    assert_eq!(state.status.and_then(|r| r.status().cloned()), Some(KycStatus::Approved));
}

#[tokio::test]
async fn stale_response_is_discarded() {
    let backend = ScriptedBackend::default();
    backend
        .fetch_mine
        .push_delayed(Duration::from_millis(150), Ok(Some(submission(1, KycStatus::Pending))));
    backend.fetch_mine.push(Ok(Some(submission(1, rejected("Photo unclear")))));
    let store = KycStore::new(backend);

    let slow = store.fetch_mine();
    let fast = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.fetch_mine().await
    };
    let (slow, fast) = tokio::join!(slow, fast);
    assert!(slow.is_ok() && fast.is_ok());

    let state = store.state().await;
    assert_eq!(
        state.my_kyc.map(|k| k.status),
        Some(rejected("Photo unclear")),
        "older response overwrote the newer one"
    );
}

#[tokio::test]
async fn concurrent_operations_keep_separate_flags() {
    let backend = ScriptedBackend::default();
    backend
        .submit
        .push_delayed(Duration::from_millis(100), Err(RequestError::network("connection reset")));
    backend.status.push(Ok(KycStatusReport::not_submitted()));
    let store = KycStore::new(backend);
    let form = valid_form();

    let submit = store.submit(&form);
    let status = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let report = store.fetch_status().await;
        (report, store.state().await)
    };
    let (submitted, (report, during)) = tokio::join!(submit, status);

    assert!(submitted.is_err());
    assert!(report.is_ok());
    assert!(during.submit.is_loading());
    assert!(during.status_check.is_success());

    let state = store.state().await;
    assert_eq!(state.submit.error(), Some("connection reset"));
    assert!(!state.submit.is_loading());
    assert_eq!(state.status_check, OperationState::Succeeded(KycStatusReport::not_submitted()));
    assert_eq!(state.status_check.error(), None);
    assert_eq!(state.status, Some(KycStatusReport::not_submitted()));
    assert_eq!(state.my_kyc, None);
}

#[tokio::test]
async fn age_check_uses_the_given_date() {
    let backend = ScriptedBackend::default();
    backend.submit.push(Ok(submission(6, KycStatus::Pending)));
    let store = KycStore::new(backend);
    let mut form = valid_form();
    form.personal.dob = "2000-01-01".into();

    let before_eighteenth = NaiveDate::from_ymd_opt(2017, 12, 31).unwrap();
    let err = store.submit_on(&form, before_eighteenth).await.unwrap_err();
    assert_eq!(err.kind, RequestErrorKind::Validation);
    assert_eq!(err.message, "You must be at least 18 years old");
    assert!(store.backend().calls().is_empty());

    let birthday = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
    assert_eq!(store.submit_on(&form, birthday).await.unwrap().id, 6);
}

#[tokio::test]
async fn pending_is_visible_while_in_flight() {
    let backend = ScriptedBackend::default();
    backend
        .submit
        .push_delayed(Duration::from_millis(100), Ok(submission(8, KycStatus::Pending)));
    let store = KycStore::new(backend);
    let form = valid_form();

    let submit = store.submit(&form);
    let observe = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.state().await
    };
    let (result, during) = tokio::join!(submit, observe);

    assert!(result.is_ok());
    assert!(during.submit.is_loading());
    assert_eq!(during.submit.error(), None);
    assert!(store.state().await.submit.is_success());
}

#[tokio::test]
async fn clear_resets_flags_but_keeps_data() {
    let backend = ScriptedBackend::default();
    backend.fetch_mine.push(Ok(Some(submission(4, KycStatus::Pending))));
    backend.submit.push(Err(RequestError::network("connection refused")));
    let store = KycStore::new(backend);
    store.fetch_mine().await.unwrap();
    let _ = store.submit(&valid_form()).await;
    assert!(store.state().await.error().is_some());

    store.clear().await;

    let state = store.state().await;
    assert_eq!(state.error(), None);
    assert_eq!(state.submit, OperationState::Idle);
    assert_eq!(state.fetch, OperationState::Idle);
    assert_eq!(state.my_kyc.map(|k| k.id), Some(4));
}
