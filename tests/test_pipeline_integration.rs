use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fairprice::config::PipelineConfig;
use fairprice::observability::TracingReporter;
use fairprice::price_infra::algorithm::{AggregationMethod, MeanAlgorithm};
use fairprice::price_infra::{FairPriceSource, PriceSource, Subscription};
use fairprice::store::{MemoryStore, PriceStore};
use fairprice::types::{Instrument, PriceEvent, RawPrice, SourceId, Window};
use fairprice::utils::clock::ManualClock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Sends one price when subscribed, then holds the streams open until cancelled.
struct SinglePriceSource {
    secs: i64,
    price: &'static str,
}

#[async_trait]
impl PriceSource for SinglePriceSource {
    async fn subscribe_price_stream(&self, cancel: CancellationToken, instrument: &Instrument) -> Subscription<PriceEvent> {
        let (price_tx, price_rx) = mpsc::channel(1);
        let (error_tx, error_rx) = mpsc::channel(1);

        price_tx
            .try_send(PriceEvent {
                instrument: instrument.clone(),
                timestamp: DateTime::<Utc>::from_timestamp(self.secs, 0).unwrap(),
                price: RawPrice::from(self.price),
            })
            .unwrap();

        tokio::spawn(async move {
            cancel.cancelled().await;
            drop(price_tx);
            drop(error_tx);
        });

        Subscription::new(price_rx, error_rx)
    }
}

fn two_sources() -> HashMap<SourceId, Arc<dyn PriceSource>> {
    let mut sources: HashMap<SourceId, Arc<dyn PriceSource>> = HashMap::new();
    sources.insert("a".into(), Arc::new(SinglePriceSource { secs: 62, price: "1.0" }));
    sources.insert("b".into(), Arc::new(SinglePriceSource { secs: 63, price: "3.0" }));
    sources
}

#[tokio::test(start_paused = true)]
async fn test_two_sources_produce_one_mean_price_per_window() {
    let instrument = Instrument::from("X");
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::from_secs(119));

    let pipeline = FairPriceSource::new(
        Arc::new(MeanAlgorithm),
        store.clone(),
        two_sources(),
        clock.clone(),
        Arc::new(TracingReporter),
        PipelineConfig::default(),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let mut subscription = pipeline.subscribe_price_stream(cancel.clone(), instrument.clone());

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(store.get_prices(&instrument, Window::from_start_secs(60)).len(), 2);

    clock.set_secs(121);

    let mut received = Vec::new();
    while let Some(event) = subscription.prices.recv().await {
        received.push(event);
        cancel.cancel();
    }
    let mut errors = Vec::new();
    while let Some(e) = subscription.errors.recv().await {
        errors.push(e);
    }

    assert!(errors.is_empty());
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].instrument, instrument);
    assert_eq!(received[0].window_start.timestamp(), 60);
    assert_eq!(received[0].price.as_str(), "2.0000000000");
    assert!(store.get_prices(&instrument, Window::from_start_secs(60)).is_empty());
    assert!(!store.windows(&instrument).contains(&Window::from_start_secs(60)));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_with_buffered_window_closes_without_emitting() {
    let instrument = Instrument::from("X");
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::from_secs(119));

    let pipeline = FairPriceSource::new(
        Arc::new(MeanAlgorithm),
        store.clone(),
        two_sources(),
        clock,
        Arc::new(TracingReporter),
        PipelineConfig::default(),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let mut subscription = pipeline.subscribe_price_stream(cancel.clone(), instrument.clone());

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(store.get_prices(&instrument, Window::from_start_secs(60)).len(), 2);

    cancel.cancel();

    let closed = tokio::time::timeout(Duration::from_secs(1), subscription.prices.recv()).await;
    assert!(matches!(closed, Ok(None)));
    assert!(subscription.errors.recv().await.is_none());

    // buffered window is left behind, never emitted
    assert_eq!(store.windows(&instrument), vec![Window::from_start_secs(60)]);
}

#[tokio::test(start_paused = true)]
async fn test_median_pipeline_over_consecutive_windows() {
    struct SteppingSource {
        prices: Vec<(i64, &'static str)>,
    }

    #[async_trait]
    impl PriceSource for SteppingSource {
        async fn subscribe_price_stream(&self, cancel: CancellationToken, instrument: &Instrument) -> Subscription<PriceEvent> {
            let (price_tx, price_rx) = mpsc::channel(self.prices.len());
            let (error_tx, error_rx) = mpsc::channel(1);
            for (secs, price) in &self.prices {
                price_tx
                    .try_send(PriceEvent {
                        instrument: instrument.clone(),
                        timestamp: DateTime::<Utc>::from_timestamp(*secs, 0).unwrap(),
                        price: RawPrice::from(*price),
                    })
                    .unwrap();
            }
            tokio::spawn(async move {
                cancel.cancelled().await;
                drop((price_tx, error_tx));
            });
            Subscription::new(price_rx, error_rx)
        }
    }

    let mut sources: HashMap<SourceId, Arc<dyn PriceSource>> = HashMap::new();
    sources.insert("a".into(), Arc::new(SteppingSource { prices: vec![(5, "1.0"), (12, "10.0")] }));
    sources.insert("b".into(), Arc::new(SteppingSource { prices: vec![(6, "2.0"), (13, "20.0")] }));
    sources.insert("c".into(), Arc::new(SteppingSource { prices: vec![(7, "100.0"), (14, "30.0")] }));

    let config = PipelineConfig {
        window_granularity_secs: 10,
        price_precision: 2,
        algorithm: AggregationMethod::Median,
        ..PipelineConfig::default()
    };

    let instrument = Instrument::from("X");
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::from_secs(9));

    let pipeline = FairPriceSource::new(
        config.algorithm.build(HashMap::new()),
        store.clone(),
        sources,
        clock.clone(),
        Arc::new(TracingReporter),
        config,
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let mut subscription = pipeline.subscribe_price_stream(cancel.clone(), instrument.clone());
    tokio::time::sleep(Duration::from_millis(500)).await;

    clock.set_secs(10);
    let first = subscription.prices.recv().await.unwrap();
    clock.set_secs(20);
    let second = subscription.prices.recv().await.unwrap();

    cancel.cancel();
    while subscription.prices.recv().await.is_some() {}

    assert_eq!((first.window_start.timestamp(), first.price.as_str()), (0, "2.00"));
    assert_eq!((second.window_start.timestamp(), second.price.as_str()), (10, "20.00"));
    assert!(store.windows(&instrument).is_empty());
}
