//! Process-wide logging setup.

pub mod tracing;

pub use self::tracing::LogFormat;

/// Install the global subscriber, format chosen by `LOG_FORMAT`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .map(|raw| LogFormat::parse(&raw))
        .unwrap_or_default();
    self::tracing::init(format);
}
