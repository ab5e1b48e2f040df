/// Error type for the symbol cache.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The server URL is invalid or the HTTP client could not be created.
    #[error(transparent)]
    Download(#[from] symsup_dl::Error),

    /// The server URL could not be parsed.
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    /// The configuration file is malformed.
    #[error(transparent)]
    Config(#[from] serde_json::Error),

    /// The raw debug database could not be retrieved.
    #[error("Fetch error: {0}")]
    Fetch(Box<dyn std::error::Error + Send + Sync>),

    /// The raw debug database could not be converted.
    #[error("Conversion error: {0}")]
    Convert(Box<dyn std::error::Error + Send + Sync>),
}
