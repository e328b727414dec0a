//! Uzhavar data model -- price quotes, news items and crop scan results,
//! plus the seed data served when the generative model is unavailable.
//!
//! Every record here is built for a single response and then dropped;
//! nothing is cached or persisted.

pub mod fallback;
pub mod locale;
pub mod model;

pub use locale::{Locale, LocalizedText};
pub use model::{
    format_iso_date, parse_iso_date, Confidence, ConfidenceError, DataSource, NewsItem,
    PriceQuote, ScanOutcome, ScanResult, Severity, Sourced, Trend,
};
