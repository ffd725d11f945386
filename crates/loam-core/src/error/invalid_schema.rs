/// A configuration error detected while building the schema.
///
/// Aborts schema construction; there is no per-property recovery.
#[derive(Debug)]
pub(super) struct InvalidSchemaError {
    message: String,
}

impl InvalidSchemaError {
    pub(super) fn new(message: impl Into<String>) -> InvalidSchemaError {
        InvalidSchemaError {
            message: message.into(),
        }
    }
}

impl core::fmt::Display for InvalidSchemaError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}
