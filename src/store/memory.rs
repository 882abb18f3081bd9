use std::collections::HashMap;
use std::sync::Arc;
use crate::store::collection::Collection;
use crate::store::PriceStore;
use crate::types::{Instrument, RawPrice, SourceId, Window};

type SourceCollection = Collection<SourceId, RawPrice>;
type WindowCollection = Collection<Window, Arc<SourceCollection>>;

/// In-memory price store: instrument -> window -> source -> raw price.
pub struct MemoryStore {
    instruments: Collection<Instrument, Arc<WindowCollection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            instruments: Collection::new(),
        }
    }

    /// Windows currently holding a bucket for the instrument, oldest first.
    pub fn windows(&self, instrument: &Instrument) -> Vec<Window> {
        let mut windows = self.instruments
            .get(instrument)
            .map(|windows| windows.keys())
            .unwrap_or_default();
        windows.sort();
        windows
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceStore for MemoryStore {
    fn add_price(&self, instrument: &Instrument, window: Window, source_id: &SourceId, price: RawPrice) {
        let windows = self.instruments
            .get_or_create(instrument.clone(), || Arc::new(Collection::new()));

        let sources = windows.get_or_create(window, || Arc::new(Collection::new()));

        sources.set(source_id.clone(), price);
    }

    fn get_prices(&self, instrument: &Instrument, window: Window) -> HashMap<SourceId, RawPrice> {
        self.instruments
            .get(instrument)
            .and_then(|windows| windows.get(&window))
            .map(|sources| sources.snapshot())
            .unwrap_or_default()
    }

    fn remove_prices(&self, instrument: &Instrument, window: Window) {
        if let Some(windows) = self.instruments.get(instrument) {
            windows.remove(&window);
        }
    }
}
