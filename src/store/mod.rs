pub mod collection;
pub mod memory;

use std::collections::HashMap;
use crate::types::{Instrument, RawPrice, SourceId, Window};

pub use memory::MemoryStore;

/// Price storage keyed by instrument, window and source.
///
/// Implementations do their own locking; callers never coordinate.
#[cfg_attr(test, mockall::automock)]
pub trait PriceStore: Send + Sync {
    /// Inserts or overwrites the value of `source_id` in the window.
    fn add_price(&self, instrument: &Instrument, window: Window, source_id: &SourceId, price: RawPrice);

    /// Copy of every value stored for the window. Empty if unknown.
    fn get_prices(&self, instrument: &Instrument, window: Window) -> HashMap<SourceId, RawPrice>;

    /// Drops the window bucket. Removing an unknown window is a no-op.
    fn remove_prices(&self, instrument: &Instrument, window: Window);
}
