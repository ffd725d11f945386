/// A payload or geometry encode/decode failure.
///
/// Fatal for the enclosing transaction or query.
#[derive(Debug)]
pub(super) struct CodecError {
    message: String,
}

impl CodecError {
    pub(super) fn new(message: impl Into<String>) -> CodecError {
        CodecError {
            message: message.into(),
        }
    }
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "codec: {}", self.message)
    }
}
