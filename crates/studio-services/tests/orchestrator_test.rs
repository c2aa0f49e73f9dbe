mod helpers;

use helpers::*;
use studio_core::models::{UploadMethod, UploadStatus};
use studio_core::AppError;

#[tokio::test]
async fn small_auto_upload_goes_inline() {
    let studio = setup().await;
    let (progress, seen) = progress_recorder();

    let outcome = studio
        .orchestrator()
        .perform_upload(&image("cat.png", 2 * MIB), None, UploadMethod::Auto, Some(progress))
        .await
        .unwrap();

    assert_eq!(outcome.method, UploadMethod::Base64);
    assert!(outcome.result.success);
    assert!(outcome.pending_upload_id.is_none());
    assert_eq!(*seen.lock().unwrap(), vec![50, 100]);

    let asset = outcome.asset.expect("asset recorded");
    assert_eq!(asset.public_id, "base64-uploads/cat");
    assert_eq!(asset.folder.as_deref(), Some("base64-uploads"));
    assert_eq!(asset.tags, vec!["user-content".to_string()]);

    assert_eq!(studio.host.inline_uploads(), 1);
    assert_eq!(studio.host.direct_uploads(), 0);

    let pending = studio
        .service
        .get_uploads_by_status(UploadStatus::Pending, None, None)
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn large_auto_upload_goes_direct() {
    let studio = setup().await;

    let outcome = studio
        .orchestrator()
        .perform_upload(&image("big.png", 20 * MIB), None, UploadMethod::Auto, None)
        .await
        .unwrap();

    assert_eq!(outcome.method, UploadMethod::Direct);
    assert_eq!(outcome.result.public_id.as_deref(), Some("direct-uploads/big"));
    assert_eq!(studio.host.direct_uploads(), 1);
    assert_eq!(studio.host.inline_uploads(), 0);

    let completed = studio
        .service
        .get_uploads_by_status(UploadStatus::Completed, None, None)
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(Some(&completed[0].id), outcome.pending_upload_id.as_ref());
    assert_eq!(completed[0].user_id.as_deref(), Some("user-initiated"));
    let result = completed[0].result.as_ref().expect("completed record has a result");
    assert_eq!(result.public_id, "direct-uploads/big");

    let asset = studio
        .service
        .get_asset("direct-uploads/big")
        .await
        .unwrap()
        .expect("asset recorded");
    assert_eq!(asset.folder.as_deref(), Some("direct-uploads"));
    assert_eq!(asset.user_id.as_deref(), Some("user-initiated"));
    assert_eq!(asset.bytes, Some(20 * MIB as u64));
}

#[tokio::test]
async fn threshold_size_goes_direct() {
    let studio = setup().await;

    let outcome = studio
        .orchestrator()
        .perform_upload(&image("edge.png", THRESHOLD as usize), None, UploadMethod::Auto, None)
        .await
        .unwrap();

    assert_eq!(outcome.method, UploadMethod::Direct);
}

#[tokio::test]
async fn explicit_method_overrides_size() {
    let studio = setup().await;
    let orchestrator = studio.orchestrator();

    let outcome = orchestrator
        .perform_upload(&image("tiny.png", 1024), None, UploadMethod::Direct, None)
        .await
        .unwrap();
    assert_eq!(outcome.method, UploadMethod::Direct);

    let outcome = orchestrator
        .perform_upload(&image("huge.png", 6 * MIB), Some("gallery"), UploadMethod::Base64, None)
        .await
        .unwrap();
    assert_eq!(outcome.method, UploadMethod::Base64);
    assert_eq!(
        outcome.asset.map(|a| a.public_id),
        Some("gallery/huge".to_string())
    );
}

#[tokio::test]
async fn credential_failure_marks_record_failed() {
    let studio = setup().await;
    studio.host.fail_credentials();

    let err = studio
        .orchestrator()
        .perform_upload(&image("big.png", 20 * MIB), None, UploadMethod::Auto, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Upload(_)));

    let failed = studio
        .service
        .get_uploads_by_status(UploadStatus::Failed, None, None)
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert!(!failed[0].error.as_deref().unwrap_or_default().is_empty());

    assert_eq!(studio.host.direct_uploads(), 0);
    assert!(studio.service.get_asset("direct-uploads/big").await.unwrap().is_none());
}

#[tokio::test]
async fn transfer_failure_marks_record_failed() {
    let studio = setup().await;
    studio.host.fail_upload_direct();

    let err = studio
        .orchestrator()
        .perform_upload(&image("big.png", 20 * MIB), None, UploadMethod::Auto, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Remote(_)));

    let failed = studio
        .service
        .get_uploads_by_status(UploadStatus::Failed, None, None)
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
    let error = failed[0].error.clone().unwrap_or_default();
    assert!(error.contains("500"), "unexpected error text: {}", error);

    for status in [UploadStatus::Pending, UploadStatus::Uploading, UploadStatus::Completed] {
        let records = studio
            .service
            .get_uploads_by_status(status, None, None)
            .await
            .unwrap();
        assert!(records.is_empty(), "stray {} record", status);
    }
    assert!(studio.service.get_asset("direct-uploads/big").await.unwrap().is_none());
}

#[tokio::test]
async fn registry_failure_after_transfer_marks_record_failed() {
    let studio = setup().await;
    sqlx::query("DROP TABLE assets")
        .execute(studio.db.pool())
        .await
        .unwrap();

    let err = studio
        .orchestrator()
        .perform_upload(&image("big.png", 20 * MIB), None, UploadMethod::Auto, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
    assert_eq!(studio.host.direct_uploads(), 1);

    let failed = studio
        .service
        .get_uploads_by_status(UploadStatus::Failed, None, None)
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
    let error = failed[0].error.clone().unwrap_or_default();
    assert!(!error.is_empty());
    assert!(failed[0].result.is_none());

    for status in [UploadStatus::Pending, UploadStatus::Uploading, UploadStatus::Completed] {
        let records = studio
            .service
            .get_uploads_by_status(status, None, None)
            .await
            .unwrap();
        assert!(records.is_empty(), "stray {} record", status);
    }
}

#[tokio::test]
async fn inline_host_failure_is_an_upload_error() {
    let studio = setup().await;
    studio.host.fail_upload();
    let (progress, seen) = progress_recorder();

    let err = studio
        .orchestrator()
        .perform_upload(&image("cat.png", 1024), None, UploadMethod::Base64, Some(progress))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Upload(_)));
    assert_eq!(*seen.lock().unwrap(), vec![50]);
    let library = studio.service.library().await.unwrap();
    assert!(library.is_empty());
}

#[tokio::test]
async fn closed_gate_rejects_uploads_before_any_work() {
    let studio = setup_unconfigured().await;

    let err = studio
        .orchestrator()
        .perform_upload(&image("big.png", 20 * MIB), None, UploadMethod::Auto, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotConfigured(_)));

    for status in [UploadStatus::Pending, UploadStatus::Failed] {
        let records = studio
            .service
            .get_uploads_by_status(status, None, None)
            .await
            .unwrap();
        assert!(records.is_empty());
    }
    assert!(studio.host.calls().is_empty());
}
