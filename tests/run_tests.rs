//! End-to-end runs against mock HTTP collaborators: the Kie.ai upload and
//! job endpoints, the webhook.site relay, and the gallery bridge.

use std::path::PathBuf;
use std::time::Duration;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sketchrender::channel::ChannelClient;
use sketchrender::error::SketchrenderError;
use sketchrender::gallery::SheetGallery;
use sketchrender::kie::KieClient;
use sketchrender::orchestrator::{RunOrchestrator, RunTiming};
use sketchrender::providers::{GenerationRequest, Provider, ResolutionTier};
use sketchrender::reconciler::RunOutcome;

fn timing(ceiling_ms: u64) -> RunTiming {
    RunTiming {
        poll_interval: Duration::from_millis(20),
        image_ceiling: Duration::from_millis(ceiling_ms),
        video_ceiling: Duration::from_millis(ceiling_ms * 2),
    }
}

fn request(providers: Vec<Provider>) -> GenerationRequest {
    GenerationRequest {
        prompt: "photorealistic architectural render".into(),
        strength: 0.55,
        resolution: ResolutionTier::OneK,
        aspect_ratio: "16:9".into(),
        providers,
    }
}

fn orchestrator_for(server: &MockServer, gallery: Option<SheetGallery>, ceiling_ms: u64) -> RunOrchestrator {
    RunOrchestrator::new(
        KieClient::with_base_urls("test-key".into(), server.uri(), server.uri()),
        ChannelClient::with_base_url(server.uri()),
        gallery,
        timing(ceiling_ms),
    )
    .quiet()
}

/// Write a tiny PNG sketch into `dir` and return its path.
fn sketch_fixture(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(16, 16));
    img.save(&path).unwrap();
    path
}

async fn mount_relay(server: &MockServer, page: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "uuid": "tok-1"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/token/tok-1/requests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/file-base64-upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {"downloadUrl": "https://cdn.mock/sketch.jpg"}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn happy_path_image_provider_succeeds() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let sketch = sketch_fixture(&dir, "sketch.png");

    mount_upload(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "msg": "success", "data": {"taskId": "task-A"}
        })))
        .mount(&server)
        .await;

    // The inbox already holds a conclusive envelope, plus noise the loop
    // must tolerate: unparseable content, an unknown task id, a duplicate.
    let envelope = serde_json::json!({
        "data": {"taskId": "task-A", "state": "success", "resultUrls": ["https://cdn.mock/out.png"]}
    })
    .to_string();
    let page = serde_json::json!({"data": [
        {"content": "not json"},
        {"content": null},
        {"content": serde_json::json!({"data": {"taskId": "ghost", "state": "success", "resultUrls": ["https://x"]}}).to_string()},
        {"content": envelope},
        {"content": envelope},
    ]});
    mount_relay(&server, page).await;

    let orch = orchestrator_for(&server, None, 5000);
    let report = orch
        .run(&[sketch], &request(vec![Provider::NanoBananaPro]))
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Complete);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.pending, 0);
    assert!(report.upload_failures.is_empty());
    assert!(report.submission_failures.is_empty());
}

#[tokio::test]
async fn nested_result_json_is_extracted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "data": {"taskId": "task-N"}
        })))
        .mount(&server)
        .await;

    let envelope = serde_json::json!({
        "data": {
            "taskId": "task-N",
            "state": "success",
            "resultJson": "{\"resultUrls\": [\"https://cdn.mock/nested.png\"]}"
        }
    })
    .to_string();
    mount_relay(&server, serde_json::json!({"data": [{"content": envelope}]})).await;

    let orch = orchestrator_for(&server, None, 5000);
    let report = orch
        .run(&[], &request(vec![Provider::Seedream45]))
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Complete);
    assert_eq!(report.succeeded, 1);
}

#[tokio::test]
async fn submission_failure_does_not_block_siblings() {
    let server = MockServer::start().await;

    // z-image is rejected with a logical error; seedream is accepted.
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .and(body_string_contains("z-image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 402, "msg": "insufficient credits"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .and(body_string_contains("seedream"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "data": {"taskId": "task-S"}
        })))
        .mount(&server)
        .await;

    let envelope = serde_json::json!({
        "data": {"taskId": "task-S", "state": "success", "resultUrls": ["https://cdn.mock/s.png"]}
    })
    .to_string();
    mount_relay(&server, serde_json::json!({"data": [{"content": envelope}]})).await;

    let orch = orchestrator_for(&server, None, 5000);
    let report = orch
        .run(&[], &request(vec![Provider::ZImage, Provider::Seedream45]))
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Complete);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.submission_failures.len(), 1);
    assert!(report.submission_failures[0].contains("z-image"));
    assert!(report.submission_failures[0].contains("402"));
}

#[tokio::test]
async fn zero_accepted_submissions_abort_before_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 500, "msg": "model offline"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"uuid": "tok-1"})))
        .mount(&server)
        .await;
    // The inbox must never be polled when no job started.
    Mock::given(method("GET"))
        .and(path("/token/tok-1/requests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let orch = orchestrator_for(&server, None, 5000);
    let err = orch
        .run(&[], &request(vec![Provider::Seedream45, Provider::ZImage]))
        .await
        .unwrap_err();

    // The error keeps every rejection reason; none is dropped with the run.
    assert!(matches!(err, SketchrenderError::NoJobsStarted { .. }));
    let text = err.to_string();
    assert!(text.contains("seedream/4.5-text-to-image"));
    assert!(text.contains("z-image"));
    assert!(text.contains("model offline"));
}

#[tokio::test]
async fn relay_provision_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let orch = orchestrator_for(&server, None, 5000);
    let err = orch
        .run(&[], &request(vec![Provider::Seedream45]))
        .await
        .unwrap_err();

    assert!(matches!(err, SketchrenderError::ChannelProvision(_)));
}

#[tokio::test]
async fn silent_providers_time_out_with_partial_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "data": {"taskId": "task-T"}
        })))
        .mount(&server)
        .await;
    mount_relay(&server, serde_json::json!({"data": []})).await;

    let orch = orchestrator_for(&server, None, 150);
    let report = orch
        .run(&[], &request(vec![Provider::Seedream45]))
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::TimedOut);
    assert_eq!(report.pending, 1);
    assert_eq!(report.succeeded, 0);
}

#[tokio::test]
async fn transient_inbox_fetch_errors_are_absorbed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "data": {"taskId": "task-R"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"uuid": "tok-1"})))
        .mount(&server)
        .await;

    // The first two polls fail server-side; the loop must treat them as
    // empty cycles and keep going until the envelope lands.
    Mock::given(method("GET"))
        .and(path("/token/tok-1/requests"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    let envelope = serde_json::json!({
        "data": {"taskId": "task-R", "state": "success", "resultUrls": ["https://cdn.mock/r.png"]}
    })
    .to_string();
    Mock::given(method("GET"))
        .and(path("/token/tok-1/requests"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": [{"content": envelope}]})),
        )
        .mount(&server)
        .await;

    let orch = orchestrator_for(&server, None, 5000);
    let report = orch
        .run(&[], &request(vec![Provider::Seedream45]))
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Complete);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.pending, 0);
}

#[tokio::test]
async fn upload_failure_skips_image_but_not_run() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let good = sketch_fixture(&dir, "good.png");
    let missing = dir.path().join("missing.png");

    mount_upload(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "data": {"taskId": "task-U"}
        })))
        .mount(&server)
        .await;

    let envelope = serde_json::json!({
        "data": {"taskId": "task-U", "state": "success", "resultUrls": ["https://cdn.mock/u.png"]}
    })
    .to_string();
    mount_relay(&server, serde_json::json!({"data": [{"content": envelope}]})).await;

    let orch = orchestrator_for(&server, None, 5000);
    let report = orch
        .run(&[missing, good], &request(vec![Provider::NanoBananaPro]))
        .await
        .unwrap();

    // One sketch never uploaded, so only one job was dispatched.
    assert_eq!(report.upload_failures.len(), 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.outcome, RunOutcome::Complete);
}

#[tokio::test]
async fn success_triggers_gallery_save() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "data": {"taskId": "task-G"}
        })))
        .mount(&server)
        .await;

    let envelope = serde_json::json!({
        "data": {"taskId": "task-G", "state": "success", "resultUrls": ["https://cdn.mock/g.png"]}
    })
    .to_string();
    // Duplicate delivery: the save must still fire exactly once.
    mount_relay(
        &server,
        serde_json::json!({"data": [{"content": envelope}, {"content": envelope}]}),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/rows"))
        .and(body_string_contains("https://cdn.mock/g.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gallery = SheetGallery::new(format!("{}/rows", server.uri()));
    let orch = orchestrator_for(&server, Some(gallery), 5000);
    let report = orch
        .run(&[], &request(vec![Provider::Seedream45]))
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    server.verify().await;
}

#[tokio::test]
async fn failed_gallery_save_does_not_revert_job() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "data": {"taskId": "task-F"}
        })))
        .mount(&server)
        .await;

    let envelope = serde_json::json!({
        "data": {"taskId": "task-F", "state": "success", "resultUrls": ["https://cdn.mock/f.png"]}
    })
    .to_string();
    mount_relay(&server, serde_json::json!({"data": [{"content": envelope}]})).await;

    Mock::given(method("POST"))
        .and(path("/rows"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gallery = SheetGallery::new(format!("{}/rows", server.uri()));
    let orch = orchestrator_for(&server, Some(gallery), 5000);
    let report = orch
        .run(&[], &request(vec![Provider::Seedream45]))
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.outcome, RunOutcome::Complete);
}
