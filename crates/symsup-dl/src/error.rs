/// Error type for symbol server downloads.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request failed or the server answered with a non-success status.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The server URL can't have path segments appended (e.g. `data:`).
    #[error("URL cannot be a base: {0}")]
    CannotBeABase(url::Url),
}
