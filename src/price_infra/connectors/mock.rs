use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::price_infra::connectors::{PriceSource, Subscription};
use crate::types::ids::Instrument;
use crate::types::price::{PriceEvent, RawPrice};

/// Debug source emitting a constant price on a fixed interval.
pub struct MockPriceSource {
    price: f64,
    interval: Duration,
}

impl MockPriceSource {
    pub fn new(price: f64, interval: Duration) -> Self {
        MockPriceSource { price, interval }
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn subscribe_price_stream(
        &self,
        cancel: CancellationToken,
        instrument: &Instrument,
    ) -> Subscription<PriceEvent> {
        let (price_tx, price_rx) = mpsc::channel(16);
        let (error_tx, error_rx) = mpsc::channel(1);

        let instrument = instrument.clone();
        let price = RawPrice::new(format!("{:.6}", self.price));
        let interval = self.interval;

        tokio::spawn(async move {
            // error_tx lives until the loop exits so both streams close together
            let _error_tx = error_tx;

            loop {
                let event = PriceEvent {
                    instrument: instrument.clone(),
                    timestamp: Utc::now(),
                    price: price.clone(),
                };

                tokio::select! {
                    _ = cancel.cancelled() => return,
                    sent = price_tx.send(event) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }

                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        });

        Subscription::new(price_rx, error_rx)
    }
}
