//! Purpose: Model decode failures and crate-level errors with stable kinds.
//! Exports: `DecodeError`, `Error`, `ErrorKind`, `to_exit_code`.
//! Role: `DecodeError` is the closed contract of the decode engine; `Error` wraps it for callers.
//! Invariants: Every `DecodeError` carries the key or index that failed.
//! Invariants: Exit code mapping is stable once published.
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The key is absent, or the receiver is not a dictionary.
    MissingKey(String),
    IncorrectType {
        key: String,
        expected: String,
        actual: String,
    },
    /// The value decoded but the caller's transform produced nothing.
    CouldntTransform { key: String },
    OutOfBounds { index: usize, len: usize },
}

impl DecodeError {
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey(key.into())
    }

    pub fn incorrect_type(
        key: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::IncorrectType {
            key: key.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn couldnt_transform(key: impl Into<String>) -> Self {
        Self::CouldntTransform { key: key.into() }
    }

    /// Key for keyed failures; `None` for positional ones.
    pub fn key(&self) -> Option<&str> {
        match self {
            DecodeError::MissingKey(key)
            | DecodeError::IncorrectType { key, .. }
            | DecodeError::CouldntTransform { key } => Some(key),
            DecodeError::OutOfBounds { .. } => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingKey(key) => write!(f, "missing key `{key}`"),
            DecodeError::IncorrectType {
                key,
                expected,
                actual,
            } => write!(f, "key `{key}` expected {expected}, found {actual}"),
            DecodeError::CouldntTransform { key } => {
                write!(f, "key `{key}` could not be transformed")
            }
            DecodeError::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds (len: {len})")
            }
        }
    }
}

impl StdError for DecodeError {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Io,
    Parse,
    Decode,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    key: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            key: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Underlying decode failure, if this error was produced by the decode engine.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        self.source.as_ref()?.downcast_ref::<DecodeError>()
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        let mut out = Error::new(ErrorKind::Decode).with_message(err.to_string());
        if let Some(key) = err.key() {
            out = out.with_key(key);
        }
        out.with_source(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {key})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Io => 3,
        ErrorKind::Parse => 4,
        ErrorKind::Decode => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, Error, ErrorKind, to_exit_code};

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::Io, 3),
            (ErrorKind::Parse, 4),
            (ErrorKind::Decode, 5),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn decode_error_converts_with_key_and_source() {
        let err: Error = DecodeError::incorrect_type("name", "String", "Bool").into();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.key(), Some("name"));
        assert_eq!(
            err.decode_error(),
            Some(&DecodeError::incorrect_type("name", "String", "Bool"))
        );
        assert_eq!(
            err.to_string(),
            "Decode: key `name` expected String, found Bool (key: name)"
        );
    }

    #[test]
    fn out_of_bounds_has_no_key() {
        let err = DecodeError::OutOfBounds { index: 3, len: 2 };
        assert_eq!(err.key(), None);
        assert_eq!(err.to_string(), "index 3 out of bounds (len: 2)");
        let wrapped: Error = err.into();
        assert_eq!(wrapped.key(), None);
    }
}
