pub mod algorithm;
pub mod connectors;
pub mod ingestion;
pub mod pipeline;
pub mod publisher;

pub use algorithm::{AggregationMethod, FairPriceAlgorithm};
pub use connectors::{PriceSource, Subscription};
pub use pipeline::FairPriceSource;
