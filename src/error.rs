use std::fmt;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Status(u16),
    Xml(xmltree::ParseError),
    MissingData(&'static str),
    UnknownZone(u8),
    Config(String),
    Io(std::io::Error),
    Refresh(Box<Error>),
    /// A command whose write and follow-up refresh both failed.
    Command { write: Box<Error>, refresh: Box<Error> },
}

impl Error {
    /// Transport failures and non-200 answers, looking through `Refresh`.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Error::Http(_) | Error::Status(_) => true,
            Error::Refresh(inner) => inner.is_connectivity(),
            Error::Command { write, .. } => write.is_connectivity(),
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Status(status) => write!(f, "HTTP {status}"),
            Error::Xml(e) => write!(f, "malformed XML: {e}"),
            Error::MissingData(element) => write!(f, "no {element} data in response"),
            Error::UnknownZone(id) => write!(f, "unknown zone: {id}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Refresh(e) => write!(f, "refresh failed: {e}"),
            Error::Command { write, refresh } => write!(f, "command failed: {write}; {refresh}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Xml(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Refresh(e) => Some(e.as_ref()),
            Error::Command { write, .. } => Some(write.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<xmltree::ParseError> for Error {
    fn from(e: xmltree::ParseError) -> Self {
        Error::Xml(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
