//! Integration tests for `OpenAiClient` and `InsightEngine` using wiremock HTTP mocks.

use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytlens_insight::{
    ChartInsight, ChatBackend, ChatRequest, Comment, InsightEngine, InsightError, MetricBundle,
    ModelSelection, OpenAiClient, OpenAiSettings, RenderedPrompt, Sampling, TaskKind,
};

fn test_client(base_url: &str) -> OpenAiClient {
    client_with_timeout(base_url, 5)
}

fn client_with_timeout(base_url: &str, timeout_secs: u64) -> OpenAiClient {
    OpenAiClient::new(&OpenAiSettings {
        api_key: "sk-test".to_string(),
        base_url: base_url.to_string(),
        timeout_secs,
    })
    .expect("client construction should not fail")
}

/// Engine whose client gives up after one second.
fn impatient_engine(base_url: &str) -> InsightEngine<OpenAiClient> {
    InsightEngine::new(
        client_with_timeout(base_url, 1),
        ModelSelection::default(),
        Sampling::Seeded(7),
    )
}

async fn mount_slow_reply(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(server)
        .await;
}

fn test_engine(base_url: &str) -> InsightEngine<OpenAiClient> {
    InsightEngine::new(
        test_client(base_url),
        ModelSelection::default(),
        Sampling::Seeded(7),
    )
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

fn text_request(user: &str) -> ChatRequest {
    ChatRequest::chart_insight(
        "gpt-4",
        RenderedPrompt {
            system: "You are terse.",
            user: user.to_string(),
        },
    )
}

fn growth_bundle() -> MetricBundle {
    MetricBundle::new(TaskKind::Growth)
        .with("total_views", 120_000_i64)
        .with("avg_views", 12_000_i64)
        .with("view_growth", 18.5)
}

#[tokio::test]
async fn complete_returns_first_choice_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4",
            "max_tokens": 100,
            "messages": [
                { "role": "system", "content": "You are terse." },
                { "role": "user", "content": "hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Views are climbing.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let reply = client
        .complete(&text_request("hello"))
        .await
        .expect("should return content");

    assert_eq!(reply, "Views are climbing.");
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/", server.uri()));
    let reply = client.complete(&text_request("hello")).await.expect("reply");
    assert_eq!(reply, "ok");
}

#[tokio::test]
async fn error_envelope_maps_to_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error"
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .complete(&text_request("hello"))
        .await
        .expect_err("401 should fail");

    assert!(err.is_upstream());
    match err {
        InsightError::Upstream { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .complete(&text_request("hello"))
        .await
        .expect_err("503 should fail");

    match err {
        InsightError::Upstream { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "service unavailable");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_map_to_empty_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .complete(&text_request("hello"))
        .await
        .expect_err("no choices should fail");

    assert!(matches!(err, InsightError::EmptyCompletion));
}

#[tokio::test]
async fn engine_analyzes_comments_in_json_mode() {
    let server = MockServer::start().await;

    let analysis = serde_json::json!({
        "keywords": [{ "word": "editing", "count": 2, "examples": ["great editing"] }],
        "sentiment": {
            "positive": 70.0,
            "negative": 10.0,
            "neutral": 20.0,
            "examples": {
                "positive": ["great editing"],
                "negative": ["too long"],
                "neutral": []
            }
        },
        "categories": [{ "name": "production", "examples": ["great editing"] }],
        "feedback": [{ "type": "request", "content": "shorter intros", "examples": ["too long"] }]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4-turbo-preview",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(&analysis.to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let comments = vec![
        Comment::new("great editing"),
        Comment::new("too long"),
        Comment::new("great editing"),
        Comment::new("   "),
    ];
    let result = engine.analyze_comments(&comments).await;

    assert_eq!(result.keywords[0].word, "editing");
    assert_eq!(result.feedback[0].kind, "request");
    assert!((result.sentiment.positive - 70.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn engine_degrades_comment_result_on_backend_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": { "message": "The server had an error" }
        })))
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let outcome = engine
        .analyze_comments_outcome(&[Comment::new("first"), Comment::new("second")])
        .await;

    assert!(matches!(
        outcome.failure(),
        Some(InsightError::Upstream { status: 500, .. })
    ));
    let result = outcome.into_result();
    assert_eq!(result.feedback[0].kind, "error");
    assert!(result.feedback[0].content.contains("The server had an error"));
    assert!((result.sentiment.neutral - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn engine_returns_chart_insight_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4",
            "max_tokens": 100
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("최근 영상 조회수가 18.5% 늘었습니다.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let insight = engine
        .analyze_chart(&growth_bundle())
        .await
        .expect("bundle renders");

    assert_eq!(insight.text(), Some("최근 영상 조회수가 18.5% 늘었습니다."));
}

#[tokio::test]
async fn engine_reports_chart_unavailable_on_backend_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "message": "Rate limit reached" }
        })))
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let insight = engine
        .analyze_chart(&growth_bundle())
        .await
        .expect("bundle renders");

    match insight {
        ChartInsight::Unavailable { reason } => assert!(reason.contains("429")),
        ChartInsight::Insight(text) => panic!("expected unavailable, got {text}"),
    }
}

#[tokio::test]
async fn engine_rejects_incomplete_bundle_without_calling_backend() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let bundle = MetricBundle::new(TaskKind::Engagement).with("like_ratio", 4.2);
    let err = engine
        .analyze_chart(&bundle)
        .await
        .expect_err("missing parameters");

    assert!(err.is_invalid_request());
}

#[tokio::test]
async fn client_timeout_maps_to_http_error() {
    let server = MockServer::start().await;
    mount_slow_reply(&server).await;

    let client = client_with_timeout(&server.uri(), 1);
    let err = client
        .complete(&text_request("hello"))
        .await
        .expect_err("slow reply should time out");

    assert!(matches!(err, InsightError::Http(_)), "got {err:?}");
    assert!(err.is_upstream());
}

#[tokio::test]
async fn engine_degrades_comment_result_on_transport_failure() {
    let server = MockServer::start().await;
    mount_slow_reply(&server).await;

    let engine = impatient_engine(&server.uri());
    let outcome = engine
        .analyze_comments_outcome(&[Comment::new("is anyone there?")])
        .await;

    assert!(matches!(outcome.failure(), Some(InsightError::Http(_))));
    let result = outcome.into_result();
    assert_eq!(result.feedback.len(), 1);
    assert_eq!(result.feedback[0].kind, "error");
    assert!(result.keywords.is_empty());
    assert!(result.categories.is_empty());
    assert!((result.sentiment.neutral - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn engine_reports_chart_unavailable_on_transport_failure() {
    let server = MockServer::start().await;
    mount_slow_reply(&server).await;

    let engine = impatient_engine(&server.uri());
    let insight = engine
        .analyze_chart(&growth_bundle())
        .await
        .expect("bundle renders");

    assert!(matches!(insight, ChartInsight::Unavailable { .. }));
}

#[tokio::test]
async fn engine_degrades_when_backend_is_unreachable() {
    // Bind then drop a listener so the port is known to be closed.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr")
    };

    let engine = test_engine(&format!("http://{addr}"));
    let outcome = engine
        .analyze_comments_outcome(&[Comment::new("hello")])
        .await;

    assert!(matches!(outcome.failure(), Some(InsightError::Http(_))));
    assert_eq!(outcome.into_result().feedback[0].kind, "error");
}
