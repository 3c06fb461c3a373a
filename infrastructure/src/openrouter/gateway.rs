//! OpenRouter completion gateway implementation

use crate::openrouter::error::{OpenRouterError, Result};
use crate::openrouter::protocol::{ChatRequest, ChatResponse, DONE_MARKER};
use async_trait::async_trait;
use balikci_application::{
    Completion, CompletionGateway, CompletionRequest, GatewayError, StreamHandle,
};
use balikci_domain::StreamEvent;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Default OpenRouter API root.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Connection settings for [`OpenRouterGateway`].
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Connect timeout, and total timeout for non-streamed requests.
    pub timeout: Duration,
    /// Sent as `HTTP-Referer` for OpenRouter app attribution.
    pub site_url: Option<String>,
    /// Sent as `X-Title`.
    pub site_name: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(120),
            site_url: None,
            site_name: None,
        }
    }
}

/// Completion gateway backed by the OpenRouter chat-completions API
pub struct OpenRouterGateway {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterGateway {
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()?;

        info!("OpenRouterGateway initialized ({})", config.base_url);

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send the request and check the status line.
    async fn post(&self, request: &CompletionRequest, stream: bool) -> Result<reqwest::Response> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(OpenRouterError::MissingApiKey)?;

        let body = ChatRequest::from_completion_request(request, stream);
        debug!(
            "POST {} (model: {}, {} messages, stream: {})",
            self.endpoint(),
            request.model,
            request.messages.len(),
            stream
        );

        let mut req = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(site_url) = &self.config.site_url {
            req = req.header("HTTP-Referer", site_url);
        }
        if let Some(site_name) = &self.config.site_name {
            req = req.header("X-Title", site_name);
        }
        if !stream {
            req = req.timeout(self.config.timeout);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("OpenRouter returned {}: {}", status, detail.trim());
            return Err(OpenRouterError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionGateway for OpenRouterGateway {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<Completion, GatewayError> {
        let response = self.post(request, false).await?;
        let raw = response.text().await.map_err(OpenRouterError::from)?;
        let body: ChatResponse = serde_json::from_str(&raw).map_err(OpenRouterError::from)?;

        if let Some(message) = body.error_message() {
            return Err(OpenRouterError::Remote(message).into());
        }
        if body.choices.is_empty() {
            return Err(OpenRouterError::UnexpectedResponse("no choices in response".to_string()).into());
        }

        Ok(Completion {
            text: body.message_content().unwrap_or_default().to_string(),
            reasoning_details: body.reasoning_details().cloned(),
        })
    }

    async fn stream(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<StreamHandle, GatewayError> {
        let response = self.post(request, true).await?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(pump_stream(response.bytes_stream(), tx));

        Ok(StreamHandle::new(rx))
    }
}

/// Decode the SSE body and forward events until the body ends or the
/// receiver goes away.
///
/// Returning drops `body`, which closes the connection; a dropped
/// [`StreamHandle`] therefore aborts the request even while the server is
/// silent.
async fn pump_stream<S, B, E>(body: S, tx: mpsc::Sender<StreamEvent>)
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut events = std::pin::pin!(body.eventsource());
    let mut full_text = String::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = tx.closed() => {
                debug!("Stream receiver dropped; closing connection");
                return;
            }
            next = events.next() => next,
        };

        let event = match next {
            Some(Ok(event)) => event,
            Some(Err(e)) => {
                warn!("Stream read failed: {}", e);
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
            None => break,
        };

        trace!("SSE event: {}", event.data);
        if !forward_payload(&event.data, &mut full_text, &tx).await {
            return;
        }
    }

    debug!("Stream finished ({} bytes)", full_text.len());
    let _ = tx.send(StreamEvent::Completed(full_text)).await;
}

/// Forward the events in one `data:` payload. Returns `false` when the
/// stream should stop.
async fn forward_payload(
    payload: &str,
    full_text: &mut String,
    tx: &mpsc::Sender<StreamEvent>,
) -> bool {
    let payload = payload.trim();
    if payload.is_empty() || payload == DONE_MARKER {
        return !tx.is_closed();
    }

    let chunk: ChatResponse = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            trace!("Skipping unparsable stream payload: {}", e);
            return !tx.is_closed();
        }
    };

    if let Some(message) = chunk.error_message() {
        let error = OpenRouterError::Remote(message);
        let _ = tx.send(StreamEvent::Error(error.to_string())).await;
        return false;
    }

    if let Some(details) = chunk.reasoning_details()
        && tx.send(StreamEvent::Reasoning(details.clone())).await.is_err()
    {
        return false;
    }

    if let Some(content) = chunk.delta_content() {
        full_text.push_str(content);
        if tx.send(StreamEvent::Delta(content.to_string())).await.is_err() {
            debug!("Stream receiver dropped; stopping");
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use balikci_domain::{Model, PromptMessage, Role};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> OpenRouterGateway {
        OpenRouterGateway::new(OpenRouterConfig {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            site_name: Some("balikci".to_string()),
            ..OpenRouterConfig::default()
        })
        .unwrap()
    }

    fn request(stream: bool) -> CompletionRequest {
        CompletionRequest {
            model: Model::default(),
            messages: vec![
                PromptMessage::new(Role::System, "rules"),
                PromptMessage::new(Role::User, "What is a closure?"),
            ],
            max_tokens: 1200,
            reasoning: true,
            stream,
        }
    }

    /// Every event the handle yields, until the producer is gone.
    async fn drain(mut handle: StreamHandle) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.next().await {
            events.push(event);
        }
        events
    }

    fn sse(events: &[&str]) -> String {
        events
            .iter()
            .map(|e| format!("data: {}\n\n", e))
            .collect::<String>()
    }

    #[tokio::test]
    async fn test_stream_forwards_deltas_and_completes() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"{"choices":[{"delta":{"role":"assistant","content":"A closure "}}]}"#,
            r#"{"choices":[{"delta":{"content":"captures"}}]}"#,
            r#"{"choices":[{"delta":{"content":" its environment.","reasoning_details":[{"type":"reasoning.text","text":"..."}]}}]}"#,
            "[DONE]",
        ]);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(header("x-title", "balikci"))
            .and(body_partial_json(json!({
                "model": "x-ai/grok-4.1-fast:free",
                "stream": true,
                "max_tokens": 1200,
                "reasoning": {"enabled": true}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let mut handle = gateway(&server).stream(&request(true)).await.unwrap();

        let mut events = Vec::new();
        while let Some(event) = handle.next().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("A closure ".to_string()),
                StreamEvent::Delta("captures".to_string()),
                StreamEvent::Reasoning(json!([{"type": "reasoning.text", "text": "..."}])),
                StreamEvent::Delta(" its environment.".to_string()),
                StreamEvent::Completed("A closure captures its environment.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_skips_comments_and_malformed_payloads() {
        let server = MockServer::start().await;
        let body = format!(
            ": OPENROUTER PROCESSING\n\n{}data: {{not json\n\ndata: \n\n{}",
            sse(&[r#"{"choices":[{"delta":{"content":"ok"}}]}"#]),
            sse(&["[DONE]"])
        );

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let handle = gateway(&server).stream(&request(true)).await.unwrap();

        assert_eq!(
            drain(handle).await,
            vec![
                StreamEvent::Delta("ok".to_string()),
                StreamEvent::Completed("ok".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_error_payload_becomes_error_event() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"{"choices":[{"delta":{"content":"par"}}]}"#,
            r#"{"error":{"code":502,"message":"Provider returned error"}}"#,
        ]);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let handle = gateway(&server).stream(&request(true)).await.unwrap();
        let events = drain(handle).await;

        assert_eq!(events[0], StreamEvent::Delta("par".to_string()));
        assert!(matches!(
            events.last(),
            Some(StreamEvent::Error(msg)) if msg.contains("Provider returned error")
        ));
        assert!(!events.iter().any(|e| matches!(e, StreamEvent::Completed(_))));
    }

    fn delta_event(text: &str) -> String {
        format!(
            "data: {}\n\n",
            json!({"choices": [{"delta": {"content": text}}]})
        )
    }

    #[tokio::test]
    async fn test_pump_decodes_events_split_across_chunks() {
        let first = delta_event("balıkçı");
        let bytes = first.as_bytes();
        // Split inside the JSON and inside the two-byte 'ı'
        let split = first.find("bal").unwrap() + 4;
        let chunks: Vec<std::result::Result<Vec<u8>, std::convert::Infallible>> = vec![
            Ok(b": OPENROUTER PROCESSING\n\n".to_vec()),
            Ok(bytes[..split].to_vec()),
            Ok(bytes[split..].to_vec()),
            Ok(delta_event(" tutar").replace('\n', "\r\n").into_bytes()),
            Ok(b"data: {not json\n\ndata: [DONE]\n\n".to_vec()),
        ];

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        pump_stream(futures::stream::iter(chunks), tx).await;

        assert_eq!(
            drain(StreamHandle::new(rx)).await,
            vec![
                StreamEvent::Delta("balıkçı".to_string()),
                StreamEvent::Delta(" tutar".to_string()),
                StreamEvent::Completed("balıkçı tutar".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_pump_stops_when_receiver_dropped_while_body_is_silent() {
        let chunks: Vec<std::result::Result<Vec<u8>, std::convert::Infallible>> =
            vec![Ok(delta_event("hi").into_bytes())];
        let body = futures::stream::iter(chunks).chain(futures::stream::pending());

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let pump = tokio::spawn(pump_stream(body, tx));

        let mut handle = StreamHandle::new(rx);
        assert_eq!(handle.next().await, Some(StreamEvent::Delta("hi".to_string())));
        drop(handle);

        let finished = tokio::time::timeout(Duration::from_secs(2), pump).await;
        assert!(finished.is_ok(), "pump kept waiting on a silent body");
    }

    #[tokio::test]
    async fn test_dropped_handle_closes_stalled_connection() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Sends one event, then stays silent until the client hangs up.
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 8192];
            let _ = socket.read(&mut buf).await.unwrap();

            let event = delta_event("hi");
            let head = "HTTP/1.1 200 OK\r\n\
                        content-type: text/event-stream\r\n\
                        transfer-encoding: chunked\r\n\r\n";
            socket.write_all(head.as_bytes()).await.unwrap();
            socket
                .write_all(format!("{:x}\r\n{}\r\n", event.len(), event).as_bytes())
                .await
                .unwrap();

            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => return true,
                    Ok(_) => continue,
                }
            }
        });

        let gateway = OpenRouterGateway::new(OpenRouterConfig {
            base_url: format!("http://{}", addr),
            api_key: Some("test-key".to_string()),
            ..OpenRouterConfig::default()
        })
        .unwrap();

        let mut handle = gateway.stream(&request(true)).await.unwrap();
        assert_eq!(handle.next().await, Some(StreamEvent::Delta("hi".to_string())));
        drop(handle);

        let closed = tokio::time::timeout(Duration::from_secs(2), server).await;
        assert!(
            matches!(closed, Ok(Ok(true))),
            "connection still open after the handle was dropped"
        );
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "No auth"}})),
            )
            .mount(&server)
            .await;

        let err = match gateway(&server).stream(&request(true)).await {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };

        assert!(matches!(err, GatewayError::Api { status: 401, .. }));
        assert_eq!(err.to_string(), "API Error: 401 Unauthorized");
    }

    #[tokio::test]
    async fn test_complete_parses_batched_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "gen-1",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "Batched answer",
                        "reasoning_details": [{"id": "r"}]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let completion = gateway(&server).complete(&request(false)).await.unwrap();

        assert_eq!(completion.text, "Batched answer");
        assert_eq!(completion.reasoning_details, Some(json!([{"id": "r"}])));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let server = MockServer::start().await;
        let gateway = OpenRouterGateway::new(OpenRouterConfig {
            base_url: server.uri(),
            api_key: None,
            ..OpenRouterConfig::default()
        })
        .unwrap();

        let err = gateway.complete(&request(false)).await.unwrap_err();

        assert!(err.to_string().contains("API key"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let gateway = OpenRouterGateway::new(OpenRouterConfig {
            base_url: "https://openrouter.ai/api/v1/".to_string(),
            ..OpenRouterConfig::default()
        })
        .unwrap();
        assert_eq!(
            gateway.endpoint(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }
}
