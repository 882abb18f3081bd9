use std::collections::HashMap;
use std::sync::Arc;
use anyhow::Context;
use fairprice::config::AppConfig;
use fairprice::observability::metrics::{register_metrics, render_metrics};
use fairprice::observability::tracing::init_tracing;
use fairprice::observability::TracingReporter;
use fairprice::output::PricePrinter;
use fairprice::price_infra::connectors::MockPriceSource;
use fairprice::price_infra::{FairPriceSource, PriceSource};
use fairprice::store::MemoryStore;
use fairprice::types::SourceId;
use fairprice::utils::clock::SystemClock;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("FAIRPRICE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.logging)?;
    register_metrics()?;

    let sources: HashMap<SourceId, Arc<dyn PriceSource>> = config
        .sources
        .iter()
        .map(|s| {
            let source: Arc<dyn PriceSource> = Arc::new(MockPriceSource::new(s.price, s.interval()));
            (s.source_id.clone(), source)
        })
        .collect();

    tracing::info!(
        "Starting fair price stream for {} from {} sources ({:?}, {}s windows)",
        config.instrument,
        sources.len(),
        config.pipeline.algorithm,
        config.pipeline.window_granularity_secs,
    );

    let pipeline = FairPriceSource::new(
        config.pipeline.algorithm.build(config.weights()),
        Arc::new(MemoryStore::new()),
        sources,
        Arc::new(SystemClock),
        Arc::new(TracingReporter),
        config.pipeline.clone(),
    )?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
            }
            tracing::info!("Shutdown requested");
            cancel.cancel();
        }
    });

    let subscription = pipeline.subscribe_price_stream(cancel, config.instrument.clone());
    let mut errors = subscription.errors;

    let printer = PricePrinter::new(config.output.format);
    let printed = printer.print(subscription.prices, &mut std::io::stdout()).await?;

    while let Some(e) = errors.recv().await {
        tracing::error!("fair price subscription: {}", e);
    }

    tracing::info!("Printed {} fair prices", printed);
    tracing::debug!("Final metrics:\n{}", render_metrics()?);

    Ok(())
}
