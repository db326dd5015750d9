use crate::traits::CompletionClient;
use async_trait::async_trait;
use glean_common::{GleanError, Result};
use glean_http::{HttpClient, HttpError, RawResponse, RequestOpts};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};

const DEFAULT_REFERER: &str = "https://github.com/yourusername/extension";
const DEFAULT_TITLE: &str = "Chrome Extension Text Processor";

/// Client-identifying strings sent with every request.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub referer: String,
    pub title: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            referer: DEFAULT_REFERER.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

pub struct OpenRouterClient {
    client: HttpClient,
    headers: HeaderMap,
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> CompletionRequest<'a> {
    /// One user-role message, streaming disabled.
    pub fn user(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenRouterClient {
    /// Create a client posting to `endpoint` (the full chat-completions URL).
    ///
    /// No timeout and no retries: each call is a single best-effort attempt.
    pub fn new(endpoint: &str, identity: ClientIdentity) -> Result<Self> {
        let client = HttpClient::new(endpoint)
            .map_err(|e| GleanError::Config(format!("HttpClient init failed: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("http-referer"),
            header_value(&identity.referer)?,
        );
        headers.insert(
            HeaderName::from_static("x-title"),
            header_value(&identity.title)?,
        );

        Ok(Self { client, headers })
    }

}

fn header_value(raw: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw)
        .map_err(|e| GleanError::Config(format!("invalid client header {raw:?}: {e}")))
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, prompt: &str, credential: &str, model: &str) -> Result<String> {
        let req = CompletionRequest::user(model, prompt);

        let resp = self
            .client
            .post_json_raw(
                "",
                &req,
                RequestOpts {
                    bearer: Some(credential),
                    headers: Some(self.headers.clone()),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_glean)?;

        let outcome = interpret_response(&resp);
        if outcome.is_err() {
            tracing::debug!(status = %resp.status, raw = %resp.body, "completion.raw_response");
        }
        outcome
    }
}

/// Turn a fully read response into the reply text or one tagged failure.
///
/// Non-2xx bodies are decoded as `{"error":{"message":..}}`; 2xx bodies must
/// carry `choices[0].message.content`.
pub fn interpret_response(resp: &RawResponse) -> Result<String> {
    let status = resp.status.as_u16();

    if !resp.is_success() {
        return match serde_json::from_str::<ErrorEnvelope>(&resp.body) {
            Ok(env) => Err(GleanError::Api {
                status,
                message: env.error.message,
            }),
            Err(_) => Err(GleanError::Http { status }),
        };
    }

    let data: CompletionResponse = serde_json::from_str(&resp.body)
        .map_err(|e| GleanError::MalformedResponse(format!("body is not valid JSON: {e}")))?;

    data.choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            GleanError::MalformedResponse("missing choices[0].message.content".to_string())
        })
}

fn http_to_glean(e: HttpError) -> GleanError {
    match e {
        HttpError::Network(msg) => GleanError::Network(msg),
        HttpError::Credential(msg) => GleanError::InvalidCredential(msg),
        HttpError::Url(msg) | HttpError::Build(msg) => GleanError::Config(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn request_body_has_single_user_message_and_no_stream() {
        let req = CompletionRequest::user("m/1", "hi");
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "model": "m/1",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false
            })
        );
    }

    #[test]
    fn decoded_error_message_is_surfaced() {
        let err = interpret_response(&raw(401, r#"{"error":{"message":"invalid key"}}"#))
            .unwrap_err();
        assert!(matches!(err, GleanError::Api { status: 401, ref message } if message == "invalid key"));
    }

    #[test]
    fn undecodable_failure_is_http_error() {
        let err = interpret_response(&raw(503, "<html>down</html>")).unwrap_err();
        assert!(matches!(err, GleanError::Http { status: 503 }));
    }

    #[test]
    fn success_without_choices_is_malformed() {
        let err = interpret_response(&raw(200, r#"{"id":"x"}"#)).unwrap_err();
        assert!(matches!(err, GleanError::MalformedResponse(_)));
    }

    #[test]
    fn success_with_empty_choices_is_malformed() {
        let err = interpret_response(&raw(200, r#"{"choices":[]}"#)).unwrap_err();
        assert!(matches!(err, GleanError::MalformedResponse(_)));
    }

    #[test]
    fn success_with_content_returns_it() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"سلام"}}]}"#;
        assert_eq!(interpret_response(&raw(200, body)).unwrap(), "سلام");
    }
}
