pub mod metrics;
pub mod reporter;
pub mod tracing;

pub use reporter::{ErrorReporter, TracingReporter};
