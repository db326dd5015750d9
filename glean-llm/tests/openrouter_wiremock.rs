mod common;

use glean_common::GleanError;
use glean_llm::openrouter::{ClientIdentity, OpenRouterClient};
use glean_llm::prompt::{Action, SUMMARY_INSTRUCTION};
use glean_llm::traits::CompletionClient;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "openai/gpt-4o-mini";

fn client_for(server: &MockServer) -> OpenRouterClient {
    OpenRouterClient::new(
        &format!("{}/api/v1/chat/completions", server.uri()),
        ClientIdentity::default(),
    )
    .expect("client builds")
}

#[tokio::test]
async fn summary_request_carries_prompt_model_and_identity_headers() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-or-test"))
        .and(header("accept", "application/json"))
        .and(header("x-title", "Chrome Extension Text Processor"))
        .and(body_json(json!({
            "model": MODEL,
            "messages": [{
                "role": "user",
                "content": format!("{SUMMARY_INSTRUCTION}\nSome article text.")
            }],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "gen-1",
            "choices": [{"message": {"role": "assistant", "content": "A short summary."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let out = client_for(&server)
        .process("Some article text.", Action::Summary, "sk-or-test", MODEL)
        .await
        .expect("completion succeeds");

    assert_eq!(out, "A short summary.");
}

#[tokio::test]
async fn unauthorized_with_error_body_is_api_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "invalid key"}})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process("text", Action::Translate, "sk-bad", MODEL)
        .await
        .unwrap_err();

    match err {
        GleanError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid key");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn plain_text_failure_is_http_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process("text", Action::Translate, "sk-ok", MODEL)
        .await
        .unwrap_err();

    assert!(matches!(err, GleanError::Http { status: 500 }));
}

#[tokio::test]
async fn success_without_choices_is_malformed() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "gen-2"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process("text", Action::TranslateSummary, "sk-ok", MODEL)
        .await
        .unwrap_err();

    assert!(matches!(err, GleanError::MalformedResponse(_)));
}

#[tokio::test]
async fn blank_credential_never_reaches_the_network() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process("text", Action::Translate, "   ", MODEL)
        .await
        .unwrap_err();

    assert!(matches!(err, GleanError::MissingCredential));
}

#[tokio::test]
async fn spaced_key_is_sent_as_given() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("authorization", "Bearer sk a b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let out = client_for(&server)
        .process("text", Action::Translate, " sk a b ", MODEL)
        .await
        .expect("completion succeeds");
    assert_eq!(out, "ok");
}

#[tokio::test]
async fn non_ascii_key_is_an_invalid_credential() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process("text", Action::Translate, "sk-ключ", MODEL)
        .await
        .unwrap_err();

    assert!(matches!(err, GleanError::InvalidCredential(_)));
    assert_eq!(err.to_string(), "Invalid API key: API key contains non-ASCII characters");
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    common::init_test_tracing();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = OpenRouterClient::new(
        &format!("http://127.0.0.1:{port}/api/v1/chat/completions"),
        ClientIdentity::default(),
    )
    .unwrap();

    let err = client
        .process("text", Action::Translate, "sk-ok", MODEL)
        .await
        .unwrap_err();

    assert!(matches!(err, GleanError::Network(_)));
}
