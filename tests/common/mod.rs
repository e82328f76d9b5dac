//! Shared fixtures: a local chat-completions endpoint and in-memory OCR.
#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use image::{DynamicImage, Rgba, RgbaImage};
use pdf_autofill::{
    AutofillConfig, AutofillError, Controller, FormAssistant, OcrExtractor, PageRasterizer,
    TextRecognizer,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// What the mock endpoint answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// HTTP 200 with a chat body whose first choice carries this content.
    Content(String),
    /// Any status with a plain-text body.
    Status(u16),
    /// HTTP 200 with this raw body.
    Raw(String),
}

impl Reply {
    pub fn content(s: &str) -> Self {
        Reply::Content(s.to_string())
    }
}

#[derive(Default)]
struct Recorded {
    hits: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
    auth: Mutex<Vec<String>>,
}

#[derive(Clone)]
struct MockState {
    /// Replies served in order; the last one repeats once the rest are used.
    script: Arc<Mutex<VecDeque<Reply>>>,
    recorded: Arc<Recorded>,
}

async fn chat_completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.recorded.hits.fetch_add(1, Ordering::SeqCst);
    state
        .recorded
        .bodies
        .lock()
        .unwrap()
        .push(serde_json::from_str(&body).unwrap_or(Value::Null));
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        state.recorded.auth.lock().unwrap().push(auth.to_string());
    }

    let reply = {
        let mut script = state.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    };

    match reply {
        Some(Reply::Content(content)) => Json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .into_response(),
        Some(Reply::Status(code)) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "mock failure",
        )
            .into_response(),
        Some(Reply::Raw(body)) => (StatusCode::OK, body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A chat-completions endpoint on `127.0.0.1:<random port>`.
pub struct MockEndpoint {
    pub url: String,
    recorded: Arc<Recorded>,
}

impl MockEndpoint {
    pub async fn start(script: Vec<Reply>) -> Self {
        let recorded = Arc::new(Recorded::default());
        let state = MockState {
            script: Arc::new(Mutex::new(script.into())),
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route(COMPLETIONS_PATH, post(chat_completions))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}{COMPLETIONS_PATH}"),
            recorded,
        }
    }

    pub fn hits(&self) -> usize {
        self.recorded.hits.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.recorded.bodies.lock().unwrap().clone()
    }

    pub fn auth_headers(&self) -> Vec<String> {
        self.recorded.auth.lock().unwrap().clone()
    }

    /// Config pointing at this endpoint with a short retry delay.
    pub fn config(&self) -> AutofillConfig {
        AutofillConfig::builder()
            .api_key("gsk_test_key")
            .endpoint(&self.url)
            .retry_delay_ms(10)
            .request_timeout_secs(5)
            .build()
            .unwrap()
    }
}

// ── In-memory OCR ────────────────────────────────────────────────────────────

/// Rasterises every PDF into `pages` blank images; width = page number.
pub struct FakeRasterizer {
    pub pages: u32,
    pub calls: AtomicUsize,
}

impl FakeRasterizer {
    pub fn new(pages: u32) -> Arc<Self> {
        Arc::new(Self {
            pages,
            calls: AtomicUsize::new(0),
        })
    }
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf: &[u8]) -> Result<Vec<DynamicImage>, AutofillError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((1..=self.pages)
            .map(|n| DynamicImage::ImageRgba8(RgbaImage::from_pixel(n, 1, Rgba([255; 4]))))
            .collect())
    }
}

/// Returns a fixed text per page (cycled if there are more pages).
pub struct ScriptedRecognizer {
    pub pages: Vec<String>,
}

impl ScriptedRecognizer {
    pub fn new(pages: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
        })
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(&self, page_num: usize, _image: &DynamicImage) -> Result<String, AutofillError> {
        Ok(self.pages[(page_num - 1) % self.pages.len()].clone())
    }
}

/// Controller wired to `endpoint` and the in-memory OCR.
pub fn controller(
    endpoint: &MockEndpoint,
    rasterizer: Arc<FakeRasterizer>,
    recognizer: Arc<ScriptedRecognizer>,
) -> Controller {
    let config = endpoint.config();
    Controller::new(
        OcrExtractor::new(rasterizer, recognizer),
        FormAssistant::from_config(&config).unwrap(),
        config.download_filename.clone(),
    )
}

/// Smallest byte string the upload check accepts.
pub fn pdf_bytes(tag: &str) -> Vec<u8> {
    format!("%PDF-1.4\n% {tag}\n%%EOF\n").into_bytes()
}
