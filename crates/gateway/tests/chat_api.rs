//! End-to-end tests of the HTTP surface with a scripted model and an
//! in-process tool registry.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use gl_domain::config::Config;
use gl_domain::error::{Error, Result};
use gl_domain::tool::ToolDefinition;
use gl_domain::transcript::{Part, ToolInvocation};
use gl_gateway::runtime::persona::PersonaPrompt;
use gl_gateway::server::build_app;
use gl_gateway::state::AppState;
use gl_providers::{Candidate, FinishReason, GenerateRequest, ModelClient};
use gl_tools::{ToolHandler, ToolRegistry};

// ── Fakes ──────────────────────────────────────────────────────────

struct ScriptedModel {
    script: Mutex<VecDeque<Result<Candidate>>>,
    seen: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    fn new(script: Vec<Result<Candidate>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerateRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(&self, req: &GenerateRequest) -> Result<Candidate> {
        self.seen.lock().unwrap().push(req.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("script exhausted".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Returns a fixed value and records the arguments it saw.
struct Fixed {
    value: Value,
    seen: Mutex<Vec<Map<String, Value>>>,
}

impl Fixed {
    fn new(value: Value) -> Arc<Self> {
        Arc::new(Self {
            value,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl ToolHandler for Fixed {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value> {
        self.seen.lock().unwrap().push(arguments.clone());
        Ok(self.value.clone())
    }
}

struct Failing;

#[async_trait::async_trait]
impl ToolHandler for Failing {
    async fn call(&self, _arguments: &Map<String, Value>) -> Result<Value> {
        Err(Error::Tool {
            tool: "get_user_stats".into(),
            message: "stats service down".into(),
        })
    }
}

fn def(name: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.into(),
        description: format!("{name} tool"),
        parameters: json!({"type": "object", "properties": {}}),
    }
}

struct Harness {
    model: Arc<ScriptedModel>,
    profile_image: Arc<Fixed>,
    generate_image: Arc<Fixed>,
    app: axum::Router,
}

fn harness(script: Vec<Result<Candidate>>) -> Harness {
    let model = ScriptedModel::new(script);
    let profile_image = Fixed::new(json!({"image_url": "https://pfp/bob.png"}));
    let generate_image = Fixed::new(json!({
        "image_url": "https://cdn/arena.png",
        "image_data_url": "data:image/png;base64,AAAA",
        "caption": "Bob enters the arena"
    }));
    let registry = ToolRegistry::builder()
        .register(def("get_profile_image"), profile_image.clone())
        .register(def("generate_image"), generate_image.clone())
        .register(def("get_user_stats"), Arc::new(Failing))
        .build()
        .unwrap();

    let state = AppState::new(
        Arc::new(Config::default()),
        PersonaPrompt::new("You are Gladius. Date: {current_date}."),
        Some(model.clone() as Arc<dyn ModelClient>),
        Arc::new(registry),
    );
    Harness {
        model,
        profile_image,
        generate_image,
        app: build_app(state),
    }
}

fn text(s: &str) -> Result<Candidate> {
    Ok(Candidate {
        parts: vec![Part::Text(s.into())],
        finish_reason: FinishReason::Normal,
    })
}

fn call(name: &str, args: Value) -> Result<Candidate> {
    Ok(Candidate {
        parts: vec![Part::ToolInvocationRequest(ToolInvocation::new(
            name,
            args.as_object().cloned().unwrap_or_default(),
        ))],
        finish_reason: FinishReason::Normal,
    })
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post_chat(app: &axum::Router, body: Value) -> (StatusCode, Value) {
    send(app, "POST", "/api/chat", Some(&body.to_string())).await
}

// ── /api/chat ──────────────────────────────────────────────────────

#[tokio::test]
async fn hello_round_trip() {
    let h = harness(vec![text("Hi there.")]);
    let (status, body) = post_chat(&h.app, json!({"message": "hello"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": "Hi there."}));

    let req = &h.model.requests()[0];
    assert_eq!(req.transcript.len(), 1);
    assert_eq!(req.transcript[0].text(), "hello");
    assert!(!req.system_instruction.contains("{current_date}"));
    assert_eq!(req.tools.len(), 3);
}

#[tokio::test]
async fn missing_or_blank_message_is_rejected_before_any_model_call() {
    let h = harness(vec![text("unused")]);
    for body in [json!({}), json!({"message": "   "}), json!({"message": null})] {
        let (status, resp) = post_chat(&h.app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp, json!({"error": "Missing message."}));
    }
    assert!(h.model.requests().is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let h = harness(vec![]);
    let (status, resp) = send(&h.app, "POST", "/api/chat", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].is_string());
}

#[tokio::test]
async fn missing_credential_is_a_server_error() {
    let state = AppState::new(
        Arc::new(Config::default()),
        PersonaPrompt::new("p"),
        None,
        Arc::new(ToolRegistry::empty()),
    );
    let app = build_app(state);
    let (status, resp) = post_chat(&app, json!({"message": "hello"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp, json!({"error": "Missing GENAI_API_KEY."}));
}

#[tokio::test]
async fn model_failure_reports_status_and_details() {
    let h = harness(vec![Err(Error::ModelUnavailable {
        status: 503,
        body: "{\"error\":\"overloaded\"}".into(),
    })]);
    let (status, resp) = post_chat(&h.app, json!({"message": "hello"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        resp,
        json!({"error": "Gemini error (503).", "details": "{\"error\":\"overloaded\"}"})
    );
}

#[tokio::test]
async fn profile_history_and_handle_reach_the_model() {
    let h = harness(vec![text("Welcome back, Bob.")]);
    let history: Vec<Value> = (0..20)
        .map(|i| {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            json!({"role": role, "content": format!("m{i}")})
        })
        .collect();
    let (status, _) = post_chat(
        &h.app,
        json!({
            "message": "who am I?",
            "profile": {"handle": "@bob", "name": "Bob", "followers": 42},
            "history": history
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let req = &h.model.requests()[0];
    assert!(req
        .system_instruction
        .ends_with("\n\nCurrent user: @bob. Name: Bob. Followers: 42."));
    assert_eq!(req.transcript.len(), 13);
    assert_eq!(req.transcript[0].text(), "m8");
    assert_eq!(req.transcript[12].text(), "who am I?");
}

#[tokio::test]
async fn loosely_typed_fields_are_coerced_not_rejected() {
    let h = harness(vec![text("ok"), text("ok")]);

    let (status, _) = post_chat(
        &h.app,
        json!({"message": 42, "handle": 7, "profile": "not an object"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_chat(
        &h.app,
        json!({"message": "stats?", "profile": {"handle": "bob", "followers": 120.0}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let requests = h.model.requests();
    assert_eq!(requests[0].transcript[0].text(), "42");
    assert!(requests[0]
        .system_instruction
        .ends_with("\n\nCurrent user: @7."));
    assert!(requests[1]
        .system_instruction
        .ends_with("\n\nCurrent user: @bob. Followers: 120."));
}

#[tokio::test]
async fn image_generation_ends_the_request_with_image_fields() {
    let h = harness(vec![
        call("get_profile_image", json!({"handle": "bob"})),
        call("generate_image", json!({"prompt": "bob in the arena"})),
        text("never reached"),
    ]);
    let (status, resp) = post_chat(&h.app, json!({"message": "draw me", "handle": "bob"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        resp,
        json!({
            "answer": "",
            "image_url": "https://cdn/arena.png",
            "image_data_url": "data:image/png;base64,AAAA",
            "image_caption": "Bob enters the arena"
        })
    );
    assert_eq!(h.model.requests().len(), 2);
    assert_eq!(h.profile_image.seen.lock().unwrap().len(), 1);
    let gen_args = h.generate_image.seen.lock().unwrap()[0].clone();
    assert_eq!(gen_args["context_image_urls"], json!(["https://pfp/bob.png"]));
}

#[tokio::test]
async fn tool_failure_is_recovered_by_the_model() {
    let h = harness(vec![
        call("get_user_stats", json!({"handle": "bob"})),
        text("Stats are unavailable right now."),
    ]);
    let (status, resp) = post_chat(&h.app, json!({"message": "stats?"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({"answer": "Stats are unavailable right now."}));

    let second = &h.model.requests()[1];
    match &second.transcript[2].parts[0] {
        Part::ToolInvocationResult { name, response } => {
            assert_eq!(name, "get_user_stats");
            assert_eq!(response["result"], json!({"error": "stats service down"}));
        }
        other => panic!("unexpected part: {other:?}"),
    }
}

#[tokio::test]
async fn safety_stop_without_text_returns_fallback() {
    let h = harness(vec![Ok(Candidate {
        parts: vec![],
        finish_reason: FinishReason::Safety,
    })]);
    let (status, resp) = post_chat(&h.app, json!({"message": "something edgy"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({"answer": "Cannot answer that."}));
}

// ── /api/tools, /api/tool, /health ─────────────────────────────────

#[tokio::test]
async fn tools_endpoint_lists_advertised_schema() {
    let h = harness(vec![]);
    let (status, resp) = send(&h.app, "GET", "/api/tools", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = resp["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["get_profile_image", "generate_image", "get_user_stats"]);
}

#[tokio::test]
async fn direct_tool_call() {
    let h = harness(vec![]);

    let (status, resp) = send(
        &h.app,
        "POST",
        "/api/tool",
        Some(r#"{"name": "get_profile_image", "arguments": {"handle": "bob"}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({"result": {"image_url": "https://pfp/bob.png"}}));

    // Non-object arguments are treated as empty.
    send(
        &h.app,
        "POST",
        "/api/tool",
        Some(r#"{"name": "get_profile_image", "arguments": [1, 2]}"#),
    )
    .await;
    assert!(h.profile_image.seen.lock().unwrap()[1].is_empty());
}

#[tokio::test]
async fn direct_tool_call_errors() {
    let h = harness(vec![]);

    let (status, resp) = send(&h.app, "POST", "/api/tool", Some(r#"{"name": " "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp, json!({"error": "Missing tool name."}));

    let (status, resp) = send(&h.app, "POST", "/api/tool", Some(r#"{"name": "nope"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp, json!({"error": "Unknown tool: nope"}));

    let (status, resp) =
        send(&h.app, "POST", "/api/tool", Some(r#"{"name": "get_user_stats"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp, json!({"error": "stats service down"}));
}

#[tokio::test]
async fn health_reports_readiness() {
    let h = harness(vec![]);
    let (status, resp) = send(&h.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["status"], "ok");
    assert_eq!(resp["model_ready"], true);
    assert_eq!(resp["tools"], 3);
}
