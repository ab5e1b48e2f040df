//! Download raw debug databases from symbol servers.

mod error;

use reqwest::{blocking::Client, redirect::Policy};
use symsup_core::SymbolPaths;
use url::Url;

pub use self::error::Error;

/// Public Microsoft symbol server.
pub const DEFAULT_SERVER_URL: &str = "http://msdl.microsoft.com/download/symbols";

/// User agent of the Microsoft symbol server client.
///
/// Some symbol servers refuse requests from unknown clients.
pub const USER_AGENT: &str = "Microsoft-Symbol-Server/6.2.9200.16384";

/// Maximum number of redirects followed per request.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Retrieves the body of a remote resource.
pub trait Fetcher {
    /// The error type for failed retrievals.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Retrieves `url` in a single attempt and returns the complete body.
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, Self::Error>;
}

/// Blocking HTTP fetcher.
///
/// Issues one GET per call, follows redirects, and treats any non-success
/// final status as a failure. There is no retry and no timeout besides the
/// transport defaults.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

#[bon::bon]
impl HttpFetcher {
    /// Creates a new fetcher.
    #[builder]
    pub fn new(
        // Value of the `User-Agent` header.
        #[builder(into, default = USER_AGENT.to_owned())]
        user_agent: String,

        // Maximum number of redirects to follow.
        #[builder(default = DEFAULT_MAX_REDIRECTS)]
        max_redirects: usize,

        // Whether to honour proxies configured in the environment.
        #[builder(default = true)]
        system_proxy: bool,
    ) -> Result<Self, Error> {
        let policy = match max_redirects {
            0 => Policy::none(),
            limit => Policy::limited(limit),
        };

        let mut builder = Client::builder().user_agent(user_agent).redirect(policy);
        if !system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Fetcher for HttpFetcher {
    type Error = Error;

    fn fetch(&self, url: &Url) -> Result<Vec<u8>, Error> {
        tracing::info!(%url, "requesting");
        let mut response = self.client.get(url.clone()).send()?.error_for_status()?;

        let mut body = Vec::new();
        response.copy_to(&mut body)?;

        tracing::info!(%url, size = body.len(), "downloaded");
        Ok(body)
    }
}

/// Returns the URL of the raw debug database for `paths` on `server`.
///
/// The raw file's root-relative segments are appended to the server URL:
/// `<server>/<debug file>/<identifier>/<stem>.pdb`.
pub fn symbol_url(server: &Url, paths: &SymbolPaths) -> Result<Url, Error> {
    let mut url = server.clone();
    url.path_segments_mut()
        .map_err(|()| Error::CannotBeABase(server.clone()))?
        .pop_if_empty()
        .extend(paths.raw_segments());

    Ok(url)
}
