mod helpers;

use helpers::*;
use studio_core::models::{Transformation, UploadMethod, UploadStatus};
use studio_core::{find_preset, AppError};

#[tokio::test]
async fn upload_without_staged_file_is_rejected() {
    let studio = setup().await;
    let mut session = studio.session();

    let err = session
        .upload_staged(UploadMethod::Auto, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(studio.host.calls().is_empty());
}

#[tokio::test]
async fn staged_file_clears_after_successful_upload() {
    let studio = setup().await;
    let mut session = studio.session();

    session.stage(image("cat.png", 1024));
    let outcome = session.upload_staged(UploadMethod::Auto, None).await.unwrap();

    assert_eq!(outcome.method, UploadMethod::Base64);
    assert!(session.staged().is_none());

    let library = session.refresh_library().await.unwrap();
    assert_eq!(library.len(), 1);
    assert_eq!(library[0].public_id, "base64-uploads/cat");
}

#[tokio::test]
async fn staged_file_survives_failed_upload() {
    let studio = setup().await;
    studio.host.fail_upload_direct();
    let mut session = studio.session();

    session.stage(image("big.png", 20 * MIB));
    assert!(session.upload_staged(UploadMethod::Auto, None).await.is_err());

    assert_eq!(session.staged().map(|f| f.name.as_str()), Some("big.png"));
    let failed = studio
        .service
        .get_uploads_by_status(UploadStatus::Failed, None, None)
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
}

#[tokio::test]
async fn deleting_selected_asset_clears_selection() {
    let studio = setup().await;
    let mut session = studio.session();

    session.stage(image("cat.png", 1024));
    let asset = session
        .upload_staged(UploadMethod::Base64, None)
        .await
        .unwrap()
        .asset
        .unwrap();
    session.select(asset);

    let result = session.delete_asset("base64-uploads/cat").await.unwrap();
    assert!(result.success);
    assert!(session.selected().is_none());
    assert!(session.preview_request().is_none());
}

#[tokio::test]
async fn failed_delete_keeps_selection() {
    let studio = setup().await;
    let mut session = studio.session();

    session.stage(image("cat.png", 1024));
    let asset = session
        .upload_staged(UploadMethod::Base64, None)
        .await
        .unwrap()
        .asset
        .unwrap();
    session.select(asset);
    studio.host.fail_destroy();

    let result = session.delete_asset("base64-uploads/cat").await.unwrap();
    assert!(!result.success);
    assert!(session.selected().is_some());
}

#[tokio::test]
async fn deleting_other_asset_keeps_selection() {
    let studio = setup().await;
    let mut session = studio.session();

    for name in ["cat.png", "dog.png"] {
        session.stage(image(name, 1024));
        session.upload_staged(UploadMethod::Base64, None).await.unwrap();
    }
    let cat = studio
        .service
        .get_asset("base64-uploads/cat")
        .await
        .unwrap()
        .unwrap();
    session.select(cat);

    session.delete_asset("base64-uploads/dog").await.unwrap();
    assert_eq!(
        session.selected().map(|a| a.public_id.as_str()),
        Some("base64-uploads/cat")
    );
}

#[tokio::test]
async fn refresh_drops_selection_missing_from_library() {
    let studio = setup().await;
    let mut session = studio.session();

    session.stage(image("cat.png", 1024));
    let asset = session
        .upload_staged(UploadMethod::Base64, None)
        .await
        .unwrap()
        .asset
        .unwrap();
    session.select(asset);

    // Removed behind the session's back
    studio.service.delete_asset("base64-uploads/cat").await.unwrap();

    let library = session.refresh_library().await.unwrap();
    assert!(library.is_empty());
    assert!(session.selected().is_none());
}

#[tokio::test]
async fn presets_merge_into_preview() {
    let studio = setup().await;
    let mut session = studio.session();

    session.stage(image("cat.png", 1024));
    let asset = session
        .upload_staged(UploadMethod::Base64, None)
        .await
        .unwrap()
        .asset
        .unwrap();
    session.select(asset.clone());

    assert_eq!(session.preview_url().await, Some(asset.secure_url.clone()));

    session.apply_preset(find_preset("circle").unwrap());
    assert_eq!(
        session.preview_url().await.as_deref(),
        Some("https://res.cloudinary.com/demo/image/upload/w_200,h_200,c_fill,r_max/base64-uploads/cat")
    );

    session.apply_transformation(&Transformation {
        width: Some(300),
        ..Default::default()
    });
    assert_eq!(session.transformation().width, Some(300));
    assert_eq!(session.transformation().height, Some(200));

    session.reset_transformation();
    assert!(session.transformation().is_empty());
    assert_eq!(session.preview_url().await, Some(asset.secure_url));
}

#[tokio::test]
async fn invalid_transformation_falls_back_to_secure_url() {
    let studio = setup().await;
    let mut session = studio.session();

    session.stage(image("cat.png", 1024));
    let asset = session
        .upload_staged(UploadMethod::Base64, None)
        .await
        .unwrap()
        .asset
        .unwrap();
    session.select(asset.clone());
    session.apply_transformation(&Transformation {
        width: Some(50_000),
        ..Default::default()
    });

    assert_eq!(session.preview_url().await, Some(asset.secure_url));
}

#[tokio::test]
async fn unconfigured_session_sees_empty_library() {
    let studio = setup_unconfigured().await;
    let mut session = studio.session();

    assert!(session.refresh_library().await.unwrap().is_empty());
    assert!(session.preview_url().await.is_none());

    session.stage(image("cat.png", 1024));
    let err = session
        .upload_staged(UploadMethod::Auto, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotConfigured(_)));
    assert!(session.staged().is_some());
}
