// tests/report_upload.rs
mod common;

use common::{fast_http, mock};
use lunch_menu_collector::{FetchError, ReportUploader, ResultMap, Transport};
use serde_json::json;

fn results() -> ResultMap {
    ResultMap::from([
        ("uncle".to_string(), "https://img/u.jpg".to_string()),
        ("mouse".to_string(), String::new()),
        ("jundam".to_string(), String::new()),
    ])
}

#[tokio::test]
async fn posts_full_map_as_json_including_empty_entries() {
    let srv = mock().start().await;
    let up = ReportUploader::new(Transport::new(&fast_http()).unwrap(), srv.report_url());
    up.upload_image(&results()).await.expect("upload ok");

    let uploads = srv.uploads();
    assert_eq!(uploads.len(), 1);
    let (ct, body) = &uploads[0];
    assert_eq!(ct.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        &json!({ "uncle": "https://img/u.jpg", "mouse": "", "jundam": "" })
    );
}

#[tokio::test]
async fn non_200_is_an_upload_failure_without_retry() {
    let srv = mock().report_status(502).start().await;
    let up = ReportUploader::new(Transport::new(&fast_http()).unwrap(), srv.report_url());
    let err = up.upload_image(&results()).await.unwrap_err();
    assert!(matches!(err, FetchError::UnexpectedStatus { .. }), "got {err:?}");
    assert_eq!(srv.uploads().len(), 1);
}
