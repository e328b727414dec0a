//! The three gateway operations, each bounded by a timeout and logged on
//! failure.

use std::sync::Arc;
use std::time::Duration;

use time::{Date, OffsetDateTime};
use tracing::{debug, warn};
use uzhavar_domain::{NewsItem, PriceQuote, ScanOutcome};

use crate::client::{GenerationRequest, LlmClient};
use crate::error::GatewayError;
use crate::gemini::{GeminiClient, ModelConfig, DEFAULT_TIMEOUT};
use crate::image::ImagePayload;
use crate::{parse, prompt};

/// Model task names, used in log fields.
const TASK_NEWS: &str = "news";
const TASK_PRICES: &str = "prices";
const TASK_SCAN: &str = "scan";

/// Entry point to the generative model.
///
/// Cheap to clone; clones share the underlying client.
#[derive(Clone)]
pub struct ModelGateway {
    client: Option<Arc<dyn LlmClient>>,
    timeout: Duration,
}

impl ModelGateway {
    /// Gateway backed by Gemini, or a disabled gateway when no key is set.
    pub fn from_config(config: &ModelConfig) -> Self {
        let client = GeminiClient::from_config(config).map(|c| Arc::new(c) as Arc<dyn LlmClient>);
        Self {
            client,
            timeout: config.timeout,
        }
    }

    /// Gateway backed by any client.
    pub fn with_client(client: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self {
            client: Some(client),
            timeout,
        }
    }

    /// Gateway that never calls a model.
    pub fn disabled() -> Self {
        Self {
            client: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the model for today's agricultural news.
    pub async fn request_news(&self) -> Result<Vec<NewsItem>, GatewayError> {
        let today = OffsetDateTime::now_utc().date();
        self.request_news_on(today).await
    }

    /// Ask the model for news, treating `today` as the current date.
    pub async fn request_news_on(&self, today: Date) -> Result<Vec<NewsItem>, GatewayError> {
        let result = async {
            let text = self
                .generate(GenerationRequest::text(prompt::news_prompt(today)))
                .await?;
            parse::parse_news(&text, today)
        }
        .await;
        log_result(TASK_NEWS, result)
    }

    /// Ask the model for current market prices.
    pub async fn request_prices(&self) -> Result<Vec<PriceQuote>, GatewayError> {
        let result = async {
            let text = self
                .generate(GenerationRequest::text(prompt::prices_prompt()))
                .await?;
            parse::parse_prices(&text)
        }
        .await;
        log_result(TASK_PRICES, result)
    }

    /// Ask the model to analyse a crop photo. `image` is raw base64 or a
    /// `data:<mime>;base64,` URI.
    pub async fn request_scan_analysis(&self, image: &str) -> Result<ScanOutcome, GatewayError> {
        let result = async {
            if !self.is_configured() {
                return Err(GatewayError::NotConfigured);
            }
            let payload = ImagePayload::parse(image)?;
            debug!(
                mime_type = payload.mime_type(),
                bytes = payload.byte_len(),
                "sending crop photo for analysis"
            );
            let text = self
                .generate(GenerationRequest::with_image(
                    prompt::scan_prompt(),
                    payload.into_inline(),
                ))
                .await?;
            parse::parse_scan(&text)
        }
        .await;
        log_result(TASK_SCAN, result)
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GatewayError> {
        let client = self.client.as_ref().ok_or(GatewayError::NotConfigured)?;
        match tokio::time::timeout(self.timeout, client.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.timeout)),
        }
    }
}

fn log_result<T>(task: &'static str, result: Result<T, GatewayError>) -> Result<T, GatewayError> {
    match &result {
        Ok(_) => debug!(task, "model call succeeded"),
        Err(GatewayError::NotConfigured) => debug!(task, "model gateway not configured"),
        Err(e) => warn!(task, upstream = e.is_upstream(), error = %e, "model call failed"),
    }
    result
}
