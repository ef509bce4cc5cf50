//! End-to-end integration tests for the Quanda ask endpoint.
//!
//! These tests start a real HTTP server on an ephemeral port with a
//! stub generative backend and exercise it over the wire with reqwest,
//! covering the full classify/solve/generate/render path.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quanda_orchestrator::{
    create_router, AnswerFormat, AppState, GenerateError, Generator, ServiceConfig,
};

/// Generator stub recording its calls.
struct RecordingGenerator {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    response: Result<String, String>,
}

impl RecordingGenerator {
    fn returning(text: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            response: Ok(text.to_string()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            response: Err(message.to_string()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt lock poisoned").clone()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt lock poisoned")
            .push(prompt.to_string());
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(GenerateError::Transport(message.clone())),
        }
    }
}

/// Starts a server on an ephemeral port and returns its address.
async fn spawn_server(config: ServiceConfig, generator: Arc<RecordingGenerator>) -> SocketAddr {
    let state = AppState::new(config, generator as Arc<dyn Generator>);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind ephemeral port");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Server terminated unexpectedly");
    });

    addr
}

async fn ask(addr: SocketAddr, body: serde_json::Value) -> (u16, serde_json::Value) {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/ask"))
        .json(&body)
        .send()
        .await
        .expect("Request failed");

    let status = response.status().as_u16();
    let json = response.json().await.expect("Response was not JSON");
    (status, json)
}

/// A solvable equation is answered locally without touching the
/// generative backend.
#[tokio::test]
async fn test_equation_answered_without_generator() {
    let generator = Arc::new(RecordingGenerator::returning("unused"));
    let addr = spawn_server(ServiceConfig::default(), Arc::clone(&generator)).await;

    let (status, body) = ask(
        addr,
        serde_json::json!({"question": "2*x + 3 = 7", "mode": "auto"}),
    )
    .await;

    assert_eq!(status, 200);
    let html = body["answer_html"].as_str().expect("answer_html missing");
    assert!(html.contains("Solution: [2]"), "unexpected answer: {html}");
    assert_eq!(generator.call_count(), 0);
}

/// A numeric expression simplifies locally.
#[tokio::test]
async fn test_expression_simplified_locally() {
    let generator = Arc::new(RecordingGenerator::returning("unused"));
    let addr = spawn_server(ServiceConfig::default(), Arc::clone(&generator)).await;

    let (status, body) = ask(addr, serde_json::json!({"question": "sin(pi/2)"})).await;

    assert_eq!(status, 200);
    let html = body["answer_html"].as_str().expect("answer_html missing");
    assert!(html.contains("Result: 1"), "unexpected answer: {html}");
    assert_eq!(generator.call_count(), 0);
}

/// A math-looking question the solver cannot handle falls back to the
/// backend with the solve prompt.
#[tokio::test]
async fn test_unsolvable_math_falls_back_to_generator() {
    let generator = Arc::new(RecordingGenerator::returning("Work through it in steps."));
    let addr = spawn_server(ServiceConfig::default(), Arc::clone(&generator)).await;

    let (status, _body) = ask(
        addr,
        serde_json::json!({"question": "prove that a + b = b + a", "mode": "math"}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(generator.call_count(), 1);
    assert_eq!(
        generator.prompts(),
        vec!["Solve step by step: prove that a + b = b + a".to_string()]
    );
}

/// Tutor mode wraps the question in the tutor prompt.
#[tokio::test]
async fn test_tutor_mode_uses_tutor_prompt() {
    let generator = Arc::new(RecordingGenerator::returning("Plants convert light."));
    let addr = spawn_server(ServiceConfig::default(), Arc::clone(&generator)).await;

    let (status, _body) = ask(
        addr,
        serde_json::json!({"question": "Explain photosynthesis", "mode": "tutor"}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(
        generator.prompts(),
        vec!["You are a helpful tutor. Explain clearly: Explain photosynthesis".to_string()]
    );
}

/// Generated markdown is rendered and sanitized before leaving the
/// server.
#[tokio::test]
async fn test_generated_markdown_is_sanitized() {
    let generator = Arc::new(RecordingGenerator::returning(
        "# Tides\n\nThe **moon** pulls the sea.\n\n<script>alert(1)</script>",
    ));
    let addr = spawn_server(ServiceConfig::default(), Arc::clone(&generator)).await;

    let (status, body) = ask(
        addr,
        serde_json::json!({"question": "Explain tides", "mode": "summary"}),
    )
    .await;

    assert_eq!(status, 200);
    let html = body["answer_html"].as_str().expect("answer_html missing");
    assert!(html.contains("<h1>Tides</h1>"), "unexpected html: {html}");
    assert!(html.contains("<strong>moon</strong>"));
    assert!(!html.contains("<script"), "script leaked: {html}");
}

/// An empty question is rejected before any routing happens.
#[tokio::test]
async fn test_empty_question_rejected() {
    let generator = Arc::new(RecordingGenerator::returning("unused"));
    let addr = spawn_server(ServiceConfig::default(), Arc::clone(&generator)).await;

    for question in ["", "   ", "\n\t"] {
        let (status, body) = ask(addr, serde_json::json!({"question": question})).await;
        assert_eq!(status, 400, "question {question:?} was not rejected");
        assert_eq!(body, serde_json::json!({"error": "No question provided"}));
    }
    assert_eq!(generator.call_count(), 0);
}

/// A body without a `question` key is treated as an empty question,
/// not as a deserialization failure.
#[tokio::test]
async fn test_missing_question_key_treated_as_empty() {
    let generator = Arc::new(RecordingGenerator::returning("unused"));
    let addr = spawn_server(ServiceConfig::default(), Arc::clone(&generator)).await;

    for body in [serde_json::json!({}), serde_json::json!({"mode": "math"})] {
        let (status, response) = ask(addr, body.clone()).await;
        assert_eq!(status, 400, "body {body} was not rejected");
        assert_eq!(
            response,
            serde_json::json!({"error": "No question provided"})
        );
    }
    assert_eq!(generator.call_count(), 0);
}

/// A backend failure surfaces as a 500 carrying the failure detail.
#[tokio::test]
async fn test_generator_failure_surfaces_as_500() {
    let generator = Arc::new(RecordingGenerator::failing("connection refused"));
    let addr = spawn_server(ServiceConfig::default(), Arc::clone(&generator)).await;

    let (status, body) = ask(
        addr,
        serde_json::json!({"question": "Explain tides", "mode": "tutor"}),
    )
    .await;

    assert_eq!(status, 500);
    let error = body["error"].as_str().expect("error missing");
    assert!(error.contains("connection refused"), "unexpected error: {error}");
}

/// A text-format deployment returns the raw answer under `answer`.
#[tokio::test]
async fn test_text_format_deployment() {
    let generator = Arc::new(RecordingGenerator::returning("**bold** stays raw"));
    let config = ServiceConfig {
        answer_format: AnswerFormat::Text,
        ..ServiceConfig::default()
    };
    let addr = spawn_server(config, Arc::clone(&generator)).await;

    let (status, body) = ask(
        addr,
        serde_json::json!({"question": "Explain tides", "mode": "tutor"}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["answer"], "**bold** stays raw");
    assert!(body.get("answer_html").is_none());
}

/// The health endpoint answers without touching the pipeline.
#[tokio::test]
async fn test_health_endpoint() {
    let generator = Arc::new(RecordingGenerator::returning("unused"));
    let addr = spawn_server(ServiceConfig::default(), Arc::clone(&generator)).await;

    let response = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("Request failed");
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("Response was not JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(generator.call_count(), 0);
}

/// The symbolic and render crates compose the same way the pipeline
/// uses them.
#[test]
fn test_symbolic_answer_survives_rendering() {
    let outcome = quanda_symbolic::try_solve("x^2 - 5*x + 4 = 0");
    let quanda_symbolic::SolveOutcome::Solved(answer) = outcome else {
        panic!("equation should be solvable");
    };
    assert_eq!(answer, "Solution: [1, 4]");

    let html = quanda_render::render(&answer);
    assert!(html.contains("Solution: [1, 4]"), "unexpected html: {html}");
}
