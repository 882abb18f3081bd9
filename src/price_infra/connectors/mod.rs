pub mod mock;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::error::Error;
use crate::types::ids::Instrument;
use crate::types::price::PriceEvent;

pub use mock::MockPriceSource;

/// Price and error streams of one subscription.
///
/// Both streams close together when the subscription ends.
pub struct Subscription<T> {
    pub prices: mpsc::Receiver<T>,
    pub errors: mpsc::Receiver<Error>,
}

impl<T> Subscription<T> {
    pub fn new(prices: mpsc::Receiver<T>, errors: mpsc::Receiver<Error>) -> Self {
        Subscription { prices, errors }
    }

    /// Subscription whose streams are already closed.
    pub fn closed() -> Self {
        let (_, prices) = mpsc::channel(1);
        let (_, errors) = mpsc::channel(1);
        Subscription { prices, errors }
    }
}

/// Upstream price feed for an instrument.
///
/// Delivery is at-least-once at best: events may be reordered, repeated,
/// or never arrive. Implementations should close both streams once
/// `cancel` fires.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn subscribe_price_stream(
        &self,
        cancel: CancellationToken,
        instrument: &Instrument,
    ) -> Subscription<PriceEvent>;
}
