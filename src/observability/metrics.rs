use lazy_static::lazy_static;
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use crate::error::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Ingestion metrics
    pub static ref PRICES_INGESTED: IntCounter = IntCounter::new(
        "prices_ingested_total",
        "Total number of price events written to the store"
    ).unwrap();

    pub static ref PRICES_REJECTED: IntCounter = IntCounter::new(
        "prices_rejected_total",
        "Total number of price values dropped as unparsable or mismatched"
    ).unwrap();

    pub static ref SUBSCRIPTIONS_OPENED: IntCounter = IntCounter::new(
        "subscriptions_opened_total",
        "Total number of source subscriptions opened"
    ).unwrap();

    pub static ref SUBSCRIPTION_RECONNECTS: IntCounter = IntCounter::new(
        "subscription_reconnects_total",
        "Total number of reconnects after a subscription ended"
    ).unwrap();

    // Publishing metrics
    pub static ref WINDOWS_PUBLISHED: IntCounter = IntCounter::new(
        "windows_published_total",
        "Total number of windows emitted as a fair price"
    ).unwrap();

    pub static ref WINDOWS_SKIPPED: IntCounter = IntCounter::new(
        "windows_skipped_total",
        "Total number of closed windows without enough data"
    ).unwrap();

    pub static ref EMISSIONS_ABANDONED: IntCounter = IntCounter::new(
        "emissions_abandoned_total",
        "Total number of fair prices not delivered to the consumer"
    ).unwrap();

    pub static ref SOURCES_PER_WINDOW: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sources_per_window",
            "Number of sources contributing to a published window"
        ).buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0])
    ).unwrap();
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(PRICES_INGESTED.clone()))?;
    REGISTRY.register(Box::new(PRICES_REJECTED.clone()))?;
    REGISTRY.register(Box::new(SUBSCRIPTIONS_OPENED.clone()))?;
    REGISTRY.register(Box::new(SUBSCRIPTION_RECONNECTS.clone()))?;
    REGISTRY.register(Box::new(WINDOWS_PUBLISHED.clone()))?;
    REGISTRY.register(Box::new(WINDOWS_SKIPPED.clone()))?;
    REGISTRY.register(Box::new(EMISSIONS_ABANDONED.clone()))?;
    REGISTRY.register(Box::new(SOURCES_PER_WINDOW.clone()))?;
    Ok(())
}

/// Text exposition of every registered metric.
pub fn render_metrics() -> Result<String> {
    use prometheus::Encoder;

    let mut buffer = Vec::new();
    prometheus::TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
