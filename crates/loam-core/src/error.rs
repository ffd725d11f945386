mod adhoc;
mod codec;
mod driver;
mod invalid_schema;
mod type_conversion;
mod unsupported;

use adhoc::AdhocError;
use codec::CodecError;
use driver::DriverError;
use invalid_schema::InvalidSchemaError;
use std::sync::Arc;
use type_conversion::TypeConversionError;
use unsupported::UnsupportedError;

/// Return early with a formatted [`Error`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Create a formatted [`Error`] without returning it.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur in Loam.
///
/// The error is a single word wide and carries an optional cause chain.
/// Context added with [`Error::context`] is displayed in reverse order: the
/// most recently added context first, ending with the root cause.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    Codec(CodecError),
    Driver(DriverError),
    InvalidSchema(InvalidSchemaError),
    TypeConversion(TypeConversionError),
    Unsupported(UnsupportedError),
}

impl Error {
    #[doc(hidden)]
    pub fn from_args(args: std::fmt::Arguments<'_>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::new(args)))
    }

    /// A configuration error detected while building the schema. Fatal at
    /// startup, never recoverable per-property.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(ErrorKind::InvalidSchema(InvalidSchemaError::new(message)))
    }

    /// A query shape the engine refuses to approximate.
    pub fn unsupported(message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Unsupported(UnsupportedError::new(message)))
    }

    /// A connection or statement-level failure. The driver's error is kept as
    /// the source for diagnostics.
    pub fn driver_operation_failed(
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Error {
        Error::from(ErrorKind::Driver(DriverError::new(err)))
    }

    /// A payload or geometry encode/decode failure.
    pub fn codec(message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Codec(CodecError::new(message)))
    }

    /// A value could not be converted to the requested type.
    pub fn type_conversion(actual: impl Into<String>, expected: &'static str) -> Error {
        Error::from(ErrorKind::TypeConversion(TypeConversionError::new(
            actual, expected,
        )))
    }

    /// Adds context to this error.
    pub fn context(self, consequent: Error) -> Error {
        let mut err = consequent;
        {
            let inner = Arc::get_mut(&mut err.inner)
                .expect("consequent error must be freshly created");
            assert!(
                inner.cause.is_none(),
                "consequent error must not already have a cause"
            );
            inner.cause = Some(self);
        }
        err
    }

    /// True when the error is a schema configuration error.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::InvalidSchema(_))
    }

    /// True when the error is an unsupported-query-shape error.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Unsupported(_))
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }
}

struct DisplayKind<'a>(&'a ErrorKind);

impl core::fmt::Display for DisplayKind<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use ErrorKind::*;

        match self.0 {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            Codec(err) => core::fmt::Display::fmt(err, f),
            Driver(err) => core::fmt::Display::fmt(err, f),
            InvalidSchema(err) => core::fmt::Display::fmt(err, f),
            TypeConversion(err) => core::fmt::Display::fmt(err, f),
            Unsupported(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.inner.kind {
            ErrorKind::Driver(err) => Some(err),
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(&DisplayKind(&err.inner.kind), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Arc::new(ErrorInner { kind, cause: None }),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_args() {
        let err = Error::from_args(format_args!("test error: {}", 42));
        assert_eq!(err.to_string(), "test error: 42");
    }

    #[test]
    fn error_chain_display() {
        let root = Error::from_args(format_args!("root cause"));
        let top = Error::from_args(format_args!("top context"));

        let chained = root.context(top);
        assert_eq!(chained.to_string(), "top context: root cause");
    }

    #[test]
    fn invalid_schema_display() {
        let err = Error::invalid_schema("unknown primitive type `strng`");
        assert_eq!(
            err.to_string(),
            "invalid schema: unknown primitive type `strng`"
        );
        assert!(err.is_invalid_schema());
    }

    #[test]
    fn unsupported_display() {
        let err = Error::unsupported("id filter spans multiple feature types");
        assert_eq!(
            err.to_string(),
            "unsupported: id filter spans multiple feature types"
        );
        assert!(err.is_unsupported());
    }

    #[test]
    fn type_conversion_display() {
        let err = Error::type_conversion("I64", "String");
        assert_eq!(err.to_string(), "cannot convert I64 to String");
    }

    #[test]
    fn driver_source_preserved() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = Error::driver_operation_failed(io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("disk on fire"));
    }
}
