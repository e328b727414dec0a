//! One-shot subcommands: `prices`, `news`, `scan`.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use uzhavar_domain::{format_iso_date, Locale, ScanOutcome, Sourced};
use uzhavar_gateway::image::mime_for_extension;
use uzhavar_gateway::ImagePayload;

use crate::orchestrator::DataOrchestrator;
use crate::OutputFormat;

pub(crate) async fn cmd_prices(
    orchestrator: &DataOrchestrator,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let prices = orchestrator.prices().await;
    match output {
        OutputFormat::Json => print_sourced_json(&prices)?,
        OutputFormat::Text => {
            for quote in prices.get() {
                println!(
                    "{:>2}. {} ({}) | {} | Rs {}/quintal | {}",
                    quote.id,
                    quote.crop.resolve(Locale::English),
                    quote.crop.resolve(Locale::Tamil),
                    quote.market.resolve(Locale::English),
                    quote.price,
                    quote.trend.as_str(),
                );
            }
            println!("source: {}", prices.source().as_str());
        }
    }
    Ok(())
}

pub(crate) async fn cmd_news(
    orchestrator: &DataOrchestrator,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let news = orchestrator.news().await;
    match output {
        OutputFormat::Json => print_sourced_json(&news)?,
        OutputFormat::Text => {
            for item in news.get() {
                println!(
                    "[{}] {}",
                    format_iso_date(item.date),
                    item.title.resolve(Locale::English)
                );
                println!("    {}", item.title.resolve(Locale::Tamil));
                println!("    {}", item.summary.resolve(Locale::English));
                if let Some(url) = &item.source_url {
                    println!("    {}", url);
                }
            }
            println!("source: {}", news.source().as_str());
        }
    }
    Ok(())
}

pub(crate) async fn cmd_scan(
    orchestrator: &DataOrchestrator,
    file: &Path,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("cannot read image {}", file.display()))?;
    let mime = file
        .extension()
        .and_then(|e| e.to_str())
        .map(mime_for_extension)
        .unwrap_or(uzhavar_gateway::image::DEFAULT_MIME_TYPE);
    let payload = ImagePayload::from_bytes(&bytes, mime)
        .with_context(|| format!("cannot use {} as a scan image", file.display()))?;

    let outcome = orchestrator.scan(&payload.to_data_uri()).await;
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_scan_text(&outcome),
    }
    Ok(())
}

/// `{"source": "model" | "fallback", "data": [...]}`
fn print_sourced_json<T: Serialize>(sourced: &Sourced<T>) -> anyhow::Result<()> {
    let body = serde_json::json!({
        "source": sourced.source(),
        "data": sourced.get(),
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_scan_text(outcome: &ScanOutcome) {
    let result = match outcome {
        ScanOutcome::NoCropDetected { error } => {
            println!("no crop detected: {}", error);
            return;
        }
        ScanOutcome::Degraded(result) => {
            println!("analysis unavailable, showing placeholder result");
            result
        }
        ScanOutcome::Detected(result) => result,
    };

    println!("crop:       {}", result.crop);
    match &result.disease {
        Some(disease) => println!("disease:    {}", disease),
        None => println!("disease:    none"),
    }
    println!("severity:   {}", result.severity_label);
    println!("remedy:     {}", result.remedy);
    println!("confidence: {}%", result.confidence.value());
}
