use std::fmt;

/// Errors from the cookie store.
///
/// `InvalidRecord` and `DomainRejected` are caller errors and leave the store
/// untouched. `KeyIntegrityViolation` means the index can no longer be trusted;
/// once seen, the store that produced it keeps returning it.
#[derive(Debug)]
pub enum Error {
    /// Malformed cookie identity, such as an empty domain or name.
    InvalidRecord(String),
    /// The cookie domain is a public suffix.
    DomainRejected(String),
    /// The index broke its own lookup contract.
    KeyIntegrityViolation(String),
    /// A `Set-Cookie` value that could not be parsed.
    Parse(cookie::ParseError),
    #[cfg(feature = "json")]
    Json(serde_json::Error),
}

impl Error {
    /// Tells if this error poisons the store it came from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::KeyIntegrityViolation(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRecord(v) => write!(f, "invalid record: {}", v),
            Error::DomainRejected(v) => write!(f, "domain rejected: {}", v),
            Error::KeyIntegrityViolation(v) => write!(f, "key integrity violation: {}", v),
            Error::Parse(v) => write!(f, "set-cookie parse: {}", v),
            #[cfg(feature = "json")]
            Error::Json(v) => write!(f, "json: {}", v),
        }
    }
}

impl std::error::Error for Error {}

impl From<cookie::ParseError> for Error {
    fn from(e: cookie::ParseError) -> Self {
        Error::Parse(e)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
