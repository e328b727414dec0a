//! Per-request choice between model data and fallback data.
//!
//! Prices and news try the gateway once; anything other than a non-empty,
//! well-shaped collection is replaced wholesale by fallback data. Scans have
//! no fallback collection, so a failed analysis becomes the degraded outcome.

use tracing::{debug, info};
use uzhavar_domain::{fallback, NewsItem, PriceQuote, ScanOutcome, Sourced};
use uzhavar_gateway::{GatewayError, ModelGateway};

#[derive(Clone)]
pub(crate) struct DataOrchestrator {
    gateway: ModelGateway,
}

impl DataOrchestrator {
    pub(crate) fn new(gateway: ModelGateway) -> Self {
        Self { gateway }
    }

    pub(crate) fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    pub(crate) async fn prices(&self) -> Sourced<Vec<PriceQuote>> {
        let result = self.gateway.request_prices().await;
        choose("prices", result, fallback::fallback_prices)
    }

    pub(crate) async fn news(&self) -> Sourced<Vec<NewsItem>> {
        let result = self.gateway.request_news().await;
        choose("news", result, fallback::fallback_news)
    }

    /// Analyse a crop photo. Never fails: gateway errors yield
    /// [`ScanOutcome::Degraded`].
    pub(crate) async fn scan(&self, image: &str) -> ScanOutcome {
        match self.gateway.request_scan_analysis(image).await {
            Ok(outcome) => {
                let no_crop = matches!(outcome, ScanOutcome::NoCropDetected { .. });
                debug!(no_crop, "scan analysed");
                outcome
            }
            Err(e) => {
                info!(reason = %e, "scan analysis failed, returning degraded result");
                ScanOutcome::degraded()
            }
        }
    }
}

fn choose<T>(
    what: &'static str,
    result: Result<Vec<T>, GatewayError>,
    fallback: impl FnOnce() -> Vec<T>,
) -> Sourced<Vec<T>> {
    match result {
        Ok(items) if !items.is_empty() => {
            debug!(what, count = items.len(), "accepted model data");
            Sourced::Accepted(items)
        }
        Ok(_) => {
            info!(what, reason = "empty collection", "serving fallback data");
            Sourced::Fallback(fallback())
        }
        Err(e) => {
            info!(what, reason = %e, "serving fallback data");
            Sourced::Fallback(fallback())
        }
    }
}
