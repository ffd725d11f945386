/// A query shape the engine refuses to approximate.
///
/// Surfaced to the caller at request time; never silently degraded into a
/// partial result.
#[derive(Debug)]
pub(super) struct UnsupportedError {
    message: String,
}

impl UnsupportedError {
    pub(super) fn new(message: impl Into<String>) -> UnsupportedError {
        UnsupportedError {
            message: message.into(),
        }
    }
}

impl core::fmt::Display for UnsupportedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported: {}", self.message)
    }
}
