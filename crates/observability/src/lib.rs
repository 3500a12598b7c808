//! Log output for the `storeadmin` binary.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Install the global subscriber. A second call keeps the first subscriber.
pub fn init(format: LogFormat) {
    crate::tracing::init(format);
}
