use crate::error::Error;

/// Error sink injected into the pipeline.
///
/// Fire-and-forget: must not block the caller and cannot fail.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, context: &str, error: &Error);
}

/// Forwards reports to `tracing` at error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, context: &str, error: &Error) {
        tracing::error!(context, "{}", error);
    }
}
