//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::{GenerationRequest, LlmClient};
use crate::error::GatewayError;

/// Public Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default text+vision model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Upper bound on a single model call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Connection settings for the generative model.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// API key; `None` disables the gateway.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ModelConfig {
    /// Default model, endpoint and timeout with the given key.
    /// A blank key counts as no key.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Client for the Gemini REST API.
///
/// Uses `ureq` (blocking) on the tokio blocking pool.
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Build a client, or `None` when the config carries no API key.
    pub fn from_config(config: &ModelConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GatewayError> {
        let url = self.endpoint();
        let api_key = self.api_key.clone();
        let timeout = self.timeout;
        let body = GenerateContentRequest::from_request(request);

        tokio::task::spawn_blocking(move || call_generate_content(&url, &api_key, timeout, &body))
            .await
            .map_err(|e| GatewayError::Network(format!("task join error: {}", e)))?
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

impl GenerateContentRequest {
    fn from_request(request: GenerationRequest) -> Self {
        let mut parts = vec![Part::Text {
            text: request.prompt,
        }];
        if let Some(image) = request.image {
            parts.push(Part::Image {
                inline_data: InlineData {
                    mime_type: image.mime_type,
                    data: image.data,
                },
            });
        }
        Self {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.4,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ── API call ─────────────────────────────────────────────────────────────────

fn call_generate_content(
    url: &str,
    api_key: &str,
    timeout: Duration,
    body: &GenerateContentRequest,
) -> Result<String, GatewayError> {
    let proxy = if is_loopback(url) {
        None
    } else {
        ureq::Proxy::try_from_env()
    };
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .proxy(proxy)
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let response = agent
        .post(url)
        .header("x-goog-api-key", api_key)
        .header("content-type", "application/json")
        .send_json(body)
        .map_err(|e| map_transport_error(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .into_body()
            .read_to_string()
            .unwrap_or_default();
        return Err(GatewayError::Api {
            status: status.as_u16(),
            message: api_error_message(&message),
        });
    }

    let parsed: GenerateContentResponse = response
        .into_body()
        .read_json()
        .map_err(|e| GatewayError::Parse(format!("failed to read model API response: {}", e)))?;

    parsed.text().ok_or(GatewayError::EmptyResponse)
}

/// Loopback endpoints bypass any proxy from the environment.
fn is_loopback(url: &str) -> bool {
    let host = url.split_once("://").map_or(url, |(_, rest)| rest);
    host.starts_with("127.") || host.starts_with("localhost") || host.starts_with("[::1]")
}

fn map_transport_error(err: ureq::Error, timeout: Duration) -> GatewayError {
    match err {
        ureq::Error::Timeout(_) => GatewayError::Timeout(timeout),
        other => GatewayError::Network(other.to_string()),
    }
}

/// Pull `error.message` out of a Gemini error body, or keep a short prefix.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InlineImage;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;

    /// Serve exactly one HTTP response on a local port, returning the base URL
    /// and a handle yielding the raw request that was received.
    fn one_shot_server(status: &str, body: &str) -> (String, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut content_length = 0usize;
            let mut chunked = false;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                    if name.eq_ignore_ascii_case("transfer-encoding") {
                        chunked = value.to_ascii_lowercase().contains("chunked");
                    }
                }
                head.push_str(&line);
            }
            let mut body = Vec::new();
            if chunked {
                loop {
                    let mut size_line = String::new();
                    reader.read_line(&mut size_line).unwrap();
                    let size = usize::from_str_radix(size_line.trim(), 16).unwrap_or(0);
                    let mut chunk = vec![0u8; size + 2];
                    reader.read_exact(&mut chunk).unwrap();
                    if size == 0 {
                        break;
                    }
                    body.extend_from_slice(&chunk[..size]);
                }
            } else {
                body.resize(content_length, 0);
                reader.read_exact(&mut body).unwrap();
            }
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            format!("{}\r\n{}", head, String::from_utf8_lossy(&body))
        });
        (format!("http://{}", addr), handle)
    }

    fn client_for(base_url: &str) -> GeminiClient {
        let config = ModelConfig::new(Some("test-key".to_string()))
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5));
        GeminiClient::from_config(&config).unwrap()
    }

    #[test]
    fn test_config_blank_key_disables() {
        assert!(!ModelConfig::new(Some("  ".to_string())).is_configured());
        assert!(GeminiClient::from_config(&ModelConfig::new(None)).is_none());
    }

    #[test]
    fn test_endpoint_format() {
        let client = client_for("https://example.test/");
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest::with_image(
            "describe",
            InlineImage {
                mime_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string(),
            },
        );
        let json = serde_json::to_value(GenerateContentRequest::from_request(request)).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["data"], "aGVsbG8=");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "[1,"}, {"text": " 2]"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("[1, 2]"));

        let empty: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(empty.text().is_none());
    }

    #[test]
    fn test_loopback_detection() {
        assert!(is_loopback("http://127.0.0.1:8080"));
        assert!(is_loopback("http://localhost:3000/x"));
        assert!(!is_loopback(DEFAULT_BASE_URL));
    }

    #[test]
    fn test_api_error_message() {
        assert_eq!(
            api_error_message(r#"{"error": {"code": 400, "message": "API key not valid"}}"#),
            "API key not valid"
        );
        assert_eq!(api_error_message("gateway down"), "gateway down");
    }

    #[tokio::test]
    async fn test_generate_against_local_server() {
        let (base_url, server) = one_shot_server(
            "200 OK",
            r#"{"candidates": [{"content": {"parts": [{"text": "[]"}]}}]}"#,
        );
        let text = client_for(&base_url)
            .generate(GenerationRequest::text("hello"))
            .await
            .unwrap();
        assert_eq!(text, "[]");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-1.5-flash:generateContent"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_generate_maps_api_error() {
        let (base_url, server) = one_shot_server(
            "403 Forbidden",
            r#"{"error": {"code": 403, "message": "permission denied"}}"#,
        );
        let err = client_for(&base_url)
            .generate(GenerationRequest::text("hello"))
            .await
            .unwrap_err();
        match err {
            GatewayError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "permission denied");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
        server.join().unwrap();
    }

    #[tokio::test]
    async fn test_generate_connection_refused_is_network_error() {
        // Bind then drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = client_for(&format!("http://127.0.0.1:{}", port))
            .generate(GenerationRequest::text("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)), "got {:?}", err);
    }
}
