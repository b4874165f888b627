/// Common result type
pub type Result<T> = core::result::Result<T, Error>;

/// Common error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed UUID or address string
    #[error("Format error: {0}")]
    Format(String),
    /// Backend or transport failure
    #[error("Connection error: {0}")]
    Connection(String),
    /// Deadline elapsed before the operation completed
    #[error("Timeout")]
    Timeout,
    /// Invalid command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Device, service or characteristic not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Input/output error
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    /// Utf8 decoding error
    #[error("UTF8 error: {0}")]
    Utf8(#[from] core::str::Utf8Error),
    /// Json format error
    #[cfg(feature = "json")]
    #[error("JSON format error: {0}")]
    JsonEnc(#[from] serde_json::Error),
    /// Yaml format error
    #[cfg(feature = "yaml")]
    #[error("YAML format error: {0}")]
    YamlEnc(#[from] serde_yaml::Error),
    /// Toml format error
    #[cfg(feature = "toml")]
    #[error("TOML format error: {0}")]
    TomlEnc(#[from] serde_toml::ser::Error),
}

impl Error {
    /// The operation outcome is unknown because its deadline elapsed
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    pub(crate) fn closed(what: &str) -> Self {
        Self::Connection(format!("{what} is closed"))
    }
}

impl From<btleplug::Error> for Error {
    fn from(error: btleplug::Error) -> Self {
        match error {
            btleplug::Error::TimedOut(_) => Self::Timeout,
            error => Self::Connection(error.to_string()),
        }
    }
}

impl From<serialport::Error> for Error {
    fn from(error: serialport::Error) -> Self {
        Self::Connection(error.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}

impl From<uuid::Error> for Error {
    fn from(error: uuid::Error) -> Self {
        Self::Format(error.to_string())
    }
}

impl From<macaddr::ParseError> for Error {
    fn from(error: macaddr::ParseError) -> Self {
        Self::Format(error.to_string())
    }
}
