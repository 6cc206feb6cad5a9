//! Integration tests for the remote clients against an in-process stub of
//! both services.
//!
//! The stub is a small axum app bound to `127.0.0.1:0`; it records what the
//! clients send so the tests can check wire shapes as well as outcomes.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use studio_core::gallery::{collect_gallery, GALLERY_LIMIT};
use studio_core::job::{Text2ImgRequest, TryOnRequest};
use studio_core::session::JobSession;
use studio_core::status::{JobHandle, JobState};
use studio_remote::api::RemoteError;
use studio_remote::backend::JobBackend;
use studio_remote::collector::{collect_results, HttpAssetFetcher};
use studio_remote::credential::{Claims, Credentials, CLOCK_SKEW_SECS, TOKEN_LIFETIME_SECS};
use studio_remote::poll::{poll_job, PollConfig};
use studio_remote::sdjob::SdJobApi;
use studio_remote::tryon::TryOnApi;

// ---------------------------------------------------------------------------
// Stub service
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Stub {
    base: String,
    /// Pending answers the result endpoint gives before reporting success.
    pending_rounds: u32,
    result_calls: Arc<AtomicU32>,
    submitted: Arc<Mutex<Option<Value>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
}

impl Stub {
    fn result_calls(&self) -> u32 {
        self.result_calls.load(Ordering::SeqCst)
    }
}

async fn sd_submit(State(stub): State<Stub>, Json(body): Json<Value>) -> Json<Value> {
    *stub.submitted.lock().unwrap() = Some(body);
    Json(json!({"code": 0, "data": {"jobUuid": "job-42"}}))
}

async fn sd_result(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if params.get("jobUuid").map(String::as_str) != Some("job-42") {
        return (StatusCode::NOT_FOUND, "unknown job").into_response();
    }
    let call = stub.result_calls.fetch_add(1, Ordering::SeqCst) + 1;
    if call <= stub.pending_rounds {
        return Json(json!({"data": {"status": 1}})).into_response();
    }
    Json(json!({"data": {
        "status": 2,
        "output": {"images": [
            {"imageUrl": format!("{}/assets/1.png", stub.base)},
            {"imageUrl": format!("{}/assets/missing.png", stub.base)},
            {"imageUrl": format!("{}/assets/2.png", stub.base)},
        ]}
    }}))
    .into_response()
}

async fn sd_list() -> Json<Value> {
    let jobs: Vec<Value> = (0..15)
        .map(|i| {
            json!({
                "input": {"txt2img": {"prompt": format!("prompt {i}")}},
                "output": {"images": [{"imageUrl": format!("http://cdn/{i}.png")}]},
            })
        })
        .collect();
    Json(json!({ "data": jobs }))
}

async fn asset(Path(name): Path<String>) -> impl IntoResponse {
    match name.as_str() {
        "1.png" => (StatusCode::OK, b"PNG-ONE".to_vec()).into_response(),
        "2.png" => (StatusCode::OK, b"PNG-TWO".to_vec()).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn broken_submit() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "checkpoint not loaded")
}

fn record_auth(stub: &Stub, headers: &HeaderMap) -> bool {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let ok = value.starts_with("Bearer ") && value.len() > "Bearer ".len();
    stub.auth_headers.lock().unwrap().push(value);
    ok
}

async fn tryon_submit(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if !record_auth(&stub, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    *stub.submitted.lock().unwrap() = Some(body);
    Json(json!({
        "code": 0,
        "data": {"task_id": "CjiIomdAMX8AAAAAARAC_g", "task_status": "submitted"},
    }))
    .into_response()
}

async fn tryon_task(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    if !record_auth(&stub, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if task_id != "CjiIomdAMX8AAAAAARAC_g" {
        return StatusCode::NOT_FOUND.into_response();
    }
    let call = stub.result_calls.fetch_add(1, Ordering::SeqCst) + 1;
    if call <= stub.pending_rounds {
        return Json(json!({"data": {"task_id": task_id, "task_status": "processing"}}))
            .into_response();
    }
    Json(json!({"data": {
        "task_id": task_id,
        "task_status": "succeed",
        "task_result": {"images": [{"index": 0, "url": format!("{}/assets/1.png", stub.base)}]},
    }}))
    .into_response()
}

async fn tryon_list(State(stub): State<Stub>, headers: HeaderMap) -> impl IntoResponse {
    if !record_auth(&stub, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"data": [
        {"task_result": {"images": [{"url": "http://cdn/t1.png"}, {"url": "http://cdn/t2.png"}]}},
        {"task_status": "failed"},
    ]}))
    .into_response()
}

async fn spawn_stub(pending_rounds: u32) -> Stub {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let stub = Stub {
        base: format!("http://{addr}"),
        pending_rounds,
        result_calls: Arc::new(AtomicU32::new(0)),
        submitted: Arc::new(Mutex::new(None)),
        auth_headers: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/api/v1/sdjob/text2img", post(sd_submit))
        .route("/api/v1/sdjob/result", get(sd_result))
        .route("/api/v1/sdjob/list", get(sd_list))
        .route("/broken/api/v1/sdjob/text2img", post(broken_submit))
        .route("/assets/{name}", get(asset))
        .route(
            "/v1/images/kolors-virtual-try-on",
            post(tryon_submit).get(tryon_list),
        )
        .route("/v1/images/kolors-virtual-try-on/{task_id}", get(tryon_task))
        .with_state(stub.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    stub
}

fn fast_poll() -> PollConfig {
    PollConfig::new(Duration::from_millis(5), 50)
}

fn credentials() -> Credentials {
    Credentials::new("ak-test", "sk-test-secret")
}

fn decode_bearer(header: &str, secret: &str) -> Claims {
    let token = header.strip_prefix("Bearer ").expect("bearer scheme");
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "nbf", "iss"]);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .expect("token signed with the secret key")
        .claims
}

// ---------------------------------------------------------------------------
// Text-to-image service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn text2img_submit_poll_collect_end_to_end() {
    let stub = spawn_stub(2).await;
    let api = SdJobApi::new(format!("{}/", stub.base));

    let request = Text2ImgRequest {
        prompt: "a \"quoted\" 提示 with emoji 🎈".to_string(),
        seed: 4242,
        ..Text2ImgRequest::new("ckpt-uuid", "DPM++ 2M Karras")
    };

    let job_id = api.submit(&request).await.unwrap();
    assert_eq!(job_id.as_str(), "job-42");

    let sent = stub.submitted.lock().unwrap().clone().unwrap();
    assert_eq!(sent["checkPointId"], "ckpt-uuid");
    assert_eq!(sent["scheduler"], "DPM++ 2M Karras");
    assert_eq!(sent["seed"], 4242);
    assert_eq!(sent["prompt"], request.prompt.as_str());
    assert_eq!(sent["negativePrompt"], request.negative_prompt.as_str());

    let mut session = JobSession::new(api.name(), job_id);
    let urls = poll_job(&api, &mut session, &fast_poll(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(stub.result_calls(), 3);
    assert_eq!(session.state(), JobState::Succeeded);
    assert_eq!(urls.len(), 3);
    assert!(urls[0].ends_with("/assets/1.png"));
    assert!(urls[1].ends_with("/assets/missing.png"));

    let fetcher = HttpAssetFetcher::new(reqwest::Client::new());
    let collected = collect_results(&fetcher, &urls).await.unwrap();
    assert_eq!(collected.failures.len(), 1);
    assert_eq!(collected.failures[0].position, 2);

    let mut zip = zip::ZipArchive::new(Cursor::new(collected.archive.into_bytes())).unwrap();
    assert_eq!(zip.len(), 2);
    let mut body = String::new();
    zip.by_name("output_file_2.png")
        .unwrap()
        .read_to_string(&mut body)
        .unwrap();
    assert_eq!(body, "PNG-TWO");
}

#[tokio::test]
async fn text2img_non_2xx_submit_surfaces_status_and_body() {
    let stub = spawn_stub(0).await;
    let api = SdJobApi::new(format!("{}/broken", stub.base));

    let result = api.submit(&Text2ImgRequest::new("ckpt", "Euler")).await;

    assert_matches!(
        result,
        Err(RemoteError::ApiError { status: 500, body }) if body == "checkpoint not loaded"
    );
}

#[tokio::test]
async fn text2img_unknown_job_fails_poll_on_first_query() {
    let stub = spawn_stub(0).await;
    let api = SdJobApi::new(stub.base.clone());
    let mut session = JobSession::new(api.name(), JobHandle::new("nope").unwrap());

    let result = poll_job(&api, &mut session, &fast_poll(), &CancellationToken::new()).await;

    assert!(result.is_err());
    assert_eq!(session.queries(), 1);
    assert_eq!(session.state(), JobState::Failed);
}

#[tokio::test]
async fn text2img_history_feeds_a_ten_item_gallery() {
    let stub = spawn_stub(0).await;
    let api = SdJobApi::new(stub.base.clone());

    let jobs = api.history().await.unwrap();
    assert_eq!(jobs.len(), 15);

    let items = collect_gallery(&jobs, GALLERY_LIMIT);
    assert_eq!(items.len(), 10);
    assert_eq!(items[0].url, "http://cdn/0.png");
    assert_eq!(items[9].label, "prompt 9");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = SdJobApi::new(format!("http://{addr}"));
    let result = api.history().await;
    assert_matches!(result, Err(RemoteError::Request(_)));
}

// ---------------------------------------------------------------------------
// Try-on service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tryon_signs_every_call_and_polls_to_success() {
    let stub = spawn_stub(1).await;
    let api = TryOnApi::new(stub.base.clone(), credentials());

    let request = TryOnRequest::new(b"person".to_vec(), b"shirt".to_vec());
    let job_id = api.submit(&request).await.unwrap();
    assert_eq!(job_id.as_str(), "CjiIomdAMX8AAAAAARAC_g");

    let sent = stub.submitted.lock().unwrap().clone().unwrap();
    assert_eq!(sent["model_name"], "kolors-virtual-try-on-v1");
    assert_eq!(sent["human_image"], "cGVyc29u");
    assert_eq!(sent["cloth_image"], "c2hpcnQ=");

    // Queries more than a second apart so each fresh token carries a later nbf.
    let config = PollConfig::new(Duration::from_millis(1100), 5);
    let mut session = JobSession::new(api.name(), job_id);
    let urls = poll_job(&api, &mut session, &config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(urls, vec![format!("{}/assets/1.png", stub.base)]);

    // One submit plus two status queries, each with its own bearer header.
    let headers = stub.auth_headers.lock().unwrap().clone();
    assert_eq!(headers.len(), 3);

    let now = chrono::Utc::now().timestamp();
    let claims: Vec<Claims> = headers
        .iter()
        .map(|h| decode_bearer(h, "sk-test-secret"))
        .collect();
    for c in &claims {
        assert_eq!(c.iss, "ak-test");
        assert_eq!(c.exp - c.nbf, TOKEN_LIFETIME_SECS + CLOCK_SKEW_SECS);
        assert!(c.nbf <= now && now <= c.exp);
    }
    assert!(claims[2].nbf > claims[0].nbf);
    assert_ne!(headers[1], headers[2]);
}

#[tokio::test]
async fn tryon_history_skips_tasks_without_results() {
    let stub = spawn_stub(0).await;
    let api = TryOnApi::new(stub.base.clone(), credentials());

    let jobs = api.history().await.unwrap();
    let items = collect_gallery(&jobs, GALLERY_LIMIT);

    let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["http://cdn/t1.png", "http://cdn/t2.png"]);
    assert!(items.iter().all(|i| i.label.is_empty()));
}
