use std::fmt;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Connection(String),
    NotReady(String),
    InvalidMode { kind: &'static str, value: String },
    Config(String),
    Vendor(String),
    Timeout,
    Io(std::io::Error),
}

impl Error {
    /// Transient transport failures: the device is marked unavailable
    /// instead of surfacing these to the caller.
    pub fn is_connection(&self) -> bool {
        match self {
            Error::Connection(_) => true,
            Error::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    pub(crate) fn invalid(kind: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidMode {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Connection(msg) => write!(f, "connection failed: {msg}"),
            Error::NotReady(reason) => write!(f, "not ready: {reason}"),
            Error::InvalidMode { kind, value } => write!(f, "invalid {kind} [{value}]"),
            Error::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Error::Vendor(msg) => write!(f, "vendor error: {msg}"),
            Error::Timeout => write!(f, "timed out"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
