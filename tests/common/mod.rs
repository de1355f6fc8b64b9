// tests/common/mod.rs
//
// Local stand-ins for the status, feed and report services.
// One axum server per test, bound to an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use lunch_menu_collector::clock::DayBoundary;
use lunch_menu_collector::config::{AppConfig, HttpSettings};
use lunch_menu_collector::SourceSet;
use serde_json::{json, Value};

pub const KEY_A: &str = "_FxbaQC";
pub const KEY_B: &str = "_CiVis";
pub const KEY_C: &str = "_vKxgdn";

#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Raw(&'static str),
    /// Never answer within any sane client timeout.
    Hang,
}

#[derive(Default)]
pub struct Recorded {
    pub status_hits: AtomicUsize,
    pub status_queries: Mutex<Vec<HashMap<String, String>>>,
    pub feed_hits: AtomicUsize,
    pub uploads: Mutex<Vec<(Option<String>, Value)>>,
}

struct MockState {
    status: Reply,
    feeds: HashMap<String, Reply>,
    report_status: u16,
    rec: Arc<Recorded>,
}

pub struct MockServer {
    pub base: String,
    pub rec: Arc<Recorded>,
}

impl MockServer {
    pub fn status_url(&self) -> String {
        format!("{}/status", self.base)
    }
    pub fn feed_base(&self) -> String {
        format!("{}/feed", self.base)
    }
    pub fn report_url(&self) -> String {
        format!("{}/report", self.base)
    }

    pub fn status_hits(&self) -> usize {
        self.rec.status_hits.load(Ordering::SeqCst)
    }
    pub fn feed_hits(&self) -> usize {
        self.rec.feed_hits.load(Ordering::SeqCst)
    }
    pub fn uploads(&self) -> Vec<(Option<String>, Value)> {
        self.rec.uploads.lock().unwrap().clone()
    }

    /// Config pointing every endpoint at this server.
    pub fn config(&self) -> AppConfig {
        AppConfig {
            status_url: self.status_url(),
            report_url: self.report_url(),
            feed_base_url: self.feed_base(),
            fetch_deadline_secs: 10,
            http: fast_http(),
            sources: SourceSet::default_lunch_spots(),
            ..AppConfig::default()
        }
    }
}

pub fn fast_http() -> HttpSettings {
    HttpSettings {
        connect_timeout_secs: 1,
        request_timeout_secs: 1,
        ..HttpSettings::default()
    }
}

pub struct MockBuilder {
    status: Reply,
    feeds: HashMap<String, Reply>,
    report_status: u16,
}

pub fn mock() -> MockBuilder {
    MockBuilder {
        status: Reply::Json(json!({ "result": {} })),
        feeds: HashMap::new(),
        report_status: 200,
    }
}

impl MockBuilder {
    pub fn status(mut self, r: Reply) -> Self {
        self.status = r;
        self
    }
    pub fn feed(mut self, key: &str, r: Reply) -> Self {
        self.feeds.insert(key.to_string(), r);
        self
    }
    pub fn report_status(mut self, code: u16) -> Self {
        self.report_status = code;
        self
    }

    pub async fn start(self) -> MockServer {
        let rec = Arc::new(Recorded::default());
        let state = Arc::new(MockState {
            status: self.status,
            feeds: self.feeds,
            report_status: self.report_status,
            rec: rec.clone(),
        });

        let app = Router::new()
            .route("/status", get(status_handler))
            .route("/feed/{key}/posts", get(feed_handler))
            .route("/report", post(report_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        MockServer {
            base: format!("http://{addr}"),
            rec,
        }
    }
}

async fn render(reply: &Reply) -> Response {
    match reply {
        Reply::Json(v) => (StatusCode::OK, axum::Json(v.clone())).into_response(),
        Reply::Status(code) => StatusCode::from_u16(*code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Reply::Raw(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            *body,
        )
            .into_response(),
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::OK.into_response()
        }
    }
}

async fn status_handler(
    State(st): State<Arc<MockState>>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    st.rec.status_hits.fetch_add(1, Ordering::SeqCst);
    st.rec.status_queries.lock().unwrap().push(q);
    render(&st.status).await
}

async fn feed_handler(State(st): State<Arc<MockState>>, Path(key): Path<String>) -> Response {
    st.rec.feed_hits.fetch_add(1, Ordering::SeqCst);
    match st.feeds.get(&key) {
        Some(r) => render(r).await,
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn report_handler(
    State(st): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ct = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let v: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    st.rec.uploads.lock().unwrap().push((ct, v));
    StatusCode::from_u16(st.report_status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        .into_response()
}

/// Start of "today" as the feed client sees it, in epoch millis.
/// Fixtures are placed relative to this so they never straddle midnight.
pub fn today_ms() -> i64 {
    DayBoundary::default().now_millis()
}

/// A posts body with a single post.
pub fn one_post(created_at: i64, kind: &str, urls: &[&str]) -> Value {
    page(vec![feed_post(created_at, kind, urls)])
}

/// One entry of a posts body.
pub fn feed_post(created_at: i64, kind: &str, urls: &[&str]) -> Value {
    json!({
        "created_at": created_at,
        "type": kind,
        "media": urls
            .iter()
            .map(|u| json!({ "type": "image", "large_url": u }))
            .collect::<Vec<_>>(),
    })
}

pub fn page(items: Vec<Value>) -> Value {
    json!({ "items": items })
}
