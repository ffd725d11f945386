/// A value could not be converted to the requested type.
#[derive(Debug)]
pub(super) struct TypeConversionError {
    actual: String,
    expected: &'static str,
}

impl TypeConversionError {
    pub(super) fn new(actual: impl Into<String>, expected: &'static str) -> TypeConversionError {
        TypeConversionError {
            actual: actual.into(),
            expected,
        }
    }
}

impl core::fmt::Display for TypeConversionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "cannot convert {} to {}", self.actual, self.expected)
    }
}
