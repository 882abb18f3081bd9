pub mod ids;
pub mod price;
pub mod window;

pub use ids::{Instrument, SourceId};
pub use price::{AggregatedPriceEvent, PriceEvent, RawPrice};
pub use window::Window;
