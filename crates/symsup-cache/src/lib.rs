//! # Breakpad symbol file cache
//!
//! Locates converted `.sym` files for crash analysis. Each search root is
//! probed in order; when a root misses, the raw debug database is downloaded
//! from a symbol server, converted with `dump_syms`, and stored under that
//! root so later lookups hit the cache.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use symsup_cache::{SymbolSupplier, SymbolResult};
//! use symsup_core::ModuleIdentity;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let supplier = SymbolSupplier::new()?;
//!
//! let module = ModuleIdentity::new("app.dll").with_debug_identifier("ABCDEF123");
//!
//! // Probes cache/app.pdb/ABCDEF123/app.sym, downloading it if needed.
//! match supplier.symbol_data(&module, ["cache"]) {
//!     SymbolResult::Found(data) => println!("{}", data.text),
//!     SymbolResult::NotFound => println!("no symbols"),
//!     SymbolResult::Interrupt => return Err("interrupted".into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Lookups are synchronous. Nothing is evicted from the cache.

mod buffers;
mod config;
mod error;
mod fs;
mod supplier;

use std::path::{Path, PathBuf};

pub use symsup_convert::{Converter, DumpSyms};
pub use symsup_core::{ModuleIdentity, SymbolPaths, SymbolResult};
pub use symsup_dl::{Fetcher, HttpFetcher};
use url::Url;

pub use self::{
    buffers::{BufferTable, SymbolBuffer},
    config::{ConverterConfig, SupplierConfig},
    error::Error,
    fs::ensure_parents,
    supplier::{OwnedSymbolData, SymbolData, SymbolSupplier},
};

/// Resolves symbol files across an ordered list of search roots.
///
/// Downloads use `F` and conversions use `C`; both can be replaced with
/// [`with_fetcher`] and [`with_converter`].
///
/// [`with_fetcher`]: Self::with_fetcher
/// [`with_converter`]: Self::with_converter
pub struct SymbolCache<F = HttpFetcher, C = DumpSyms>
where
    F: Fetcher,
    C: Converter,
{
    /// Base URL that replaces the root when downloading.
    server_url: Url,

    /// Retrieves raw debug databases.
    fetcher: F,

    /// Converts raw debug databases into symbol files.
    converter: C,
}

impl SymbolCache {
    /// Creates a cache that downloads from the public Microsoft symbol
    /// server and converts with the host's default `dump_syms` setup.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            server_url: Url::parse(symsup_dl::DEFAULT_SERVER_URL)?,
            fetcher: HttpFetcher::builder().build()?,
            converter: DumpSyms::default(),
        })
    }

    /// Creates a cache from a configuration.
    pub fn from_config(config: &SupplierConfig) -> Result<Self, Error> {
        Ok(Self {
            server_url: Url::parse(&config.server_url)?,
            fetcher: HttpFetcher::builder().build()?,
            converter: DumpSyms::from(&config.converter),
        })
    }
}

impl<F, C> SymbolCache<F, C>
where
    F: Fetcher,
    C: Converter,
{
    /// Creates a cache from its parts.
    pub fn from_parts(server_url: Url, fetcher: F, converter: C) -> Self {
        Self {
            server_url,
            fetcher,
            converter,
        }
    }

    /// Replaces the symbol server URL.
    pub fn with_server_url(self, server_url: Url) -> Self {
        Self { server_url, ..self }
    }

    /// Replaces the fetcher.
    pub fn with_fetcher<G>(self, fetcher: G) -> SymbolCache<G, C>
    where
        G: Fetcher,
    {
        SymbolCache {
            server_url: self.server_url,
            fetcher,
            converter: self.converter,
        }
    }

    /// Replaces the converter.
    pub fn with_converter<D>(self, converter: D) -> SymbolCache<F, D>
    where
        D: Converter,
    {
        SymbolCache {
            server_url: self.server_url,
            fetcher: self.fetcher,
            converter,
        }
    }

    /// Returns the symbol server URL.
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Returns the fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the converter.
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Locates the symbol file of `module`.
    ///
    /// Roots are tried in order and each is tried once. A root that misses
    /// is populated from the symbol server before moving on. The first root
    /// that produces anything other than [`SymbolResult::NotFound`] wins.
    pub fn symbol_file(
        &self,
        module: &ModuleIdentity,
        roots: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> SymbolResult<PathBuf> {
        for root in roots {
            match self.symbol_file_from_root(module, root.as_ref()) {
                SymbolResult::NotFound => continue,
                result => return result,
            }
        }

        SymbolResult::NotFound
    }

    /// Locates the symbol file of `module` under a single root.
    pub fn symbol_file_from_root(
        &self,
        module: &ModuleIdentity,
        root: impl AsRef<Path>,
    ) -> SymbolResult<PathBuf> {
        let paths = match SymbolPaths::resolve(root, module) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::error!(%err, "can't construct symbol file path");
                return SymbolResult::NotFound;
            }
        };

        let symbol_file = paths.symbol_file();
        tracing::debug!(path = %symbol_file.display(), "probing");

        if !symbol_file.exists() {
            if let Err(err) = self.recover(&paths) {
                tracing::warn!(%err, path = %symbol_file.display(), "recovery failed");
            }

            if !symbol_file.exists() {
                tracing::info!(path = %symbol_file.display(), "no symbol file");
                return SymbolResult::NotFound;
            }
        }

        SymbolResult::Found(symbol_file.to_path_buf())
    }

    /// Downloads and converts the raw debug database into the symbol file
    /// location.
    ///
    /// The raw file is removed after a successful conversion and kept for
    /// inspection otherwise.
    fn recover(&self, paths: &SymbolPaths) -> Result<(), Error> {
        let url = symsup_dl::symbol_url(&self.server_url, paths)?;

        let data = self
            .fetcher
            .fetch(&url)
            .map_err(|err| Error::Fetch(err.into()))?;

        let raw_file = paths.raw_file();
        if let Err(err) = store(raw_file, &data) {
            tracing::warn!(%err, path = %raw_file.display(), "failed to store raw file");
        }
        drop(data);

        self.converter
            .convert(raw_file, paths.symbol_file())
            .map_err(|err| Error::Convert(err.into()))?;

        tracing::info!(path = %paths.symbol_file().display(), "converted");

        if let Err(err) = std::fs::remove_file(raw_file) {
            tracing::warn!(%err, path = %raw_file.display(), "failed to remove raw file");
        }

        Ok(())
    }
}

/// Writes `data` to `path`, creating parent directories as needed.
fn store(path: &Path, data: &[u8]) -> std::io::Result<()> {
    ensure_parents(path)?;
    std::fs::write(path, data)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{io, sync::Mutex};

    use super::*;

    /// Serves a fixed body, or fails when there is none.
    #[derive(Default)]
    pub struct FakeFetcher {
        pub body: Option<Vec<u8>>,
        pub requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn serving(body: &[u8]) -> Self {
            Self {
                body: Some(body.to_vec()),
                ..Default::default()
            }
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Fetcher for FakeFetcher {
        type Error = io::Error;

        fn fetch(&self, url: &Url) -> Result<Vec<u8>, io::Error> {
            self.requests.lock().unwrap().push(url.to_string());

            match &self.body {
                Some(body) => Ok(body.clone()),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "404")),
            }
        }
    }

    /// Prefixes the raw file's contents with a `MODULE` line, or fails.
    #[derive(Default)]
    pub struct FakeConverter {
        pub fail: bool,
        pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    }

    impl FakeConverter {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Converter for FakeConverter {
        type Error = io::Error;

        fn convert(&self, raw_file: &Path, symbol_file: &Path) -> Result<(), io::Error> {
            self.calls
                .lock()
                .unwrap()
                .push((raw_file.to_path_buf(), symbol_file.to_path_buf()));

            if self.fail {
                return Err(io::Error::other("exit status: 1"));
            }

            let raw = std::fs::read(raw_file)?;
            let mut text = b"MODULE windows x86_64 ABCDEF123 app.pdb\n".to_vec();
            text.extend_from_slice(&raw);
            std::fs::write(symbol_file, text)
        }
    }

    pub fn cache(
        fetcher: FakeFetcher,
        converter: FakeConverter,
    ) -> SymbolCache<FakeFetcher, FakeConverter> {
        SymbolCache::from_parts(
            Url::parse("http://symbols.test/download/symbols").unwrap(),
            fetcher,
            converter,
        )
    }

    pub fn module() -> ModuleIdentity {
        ModuleIdentity::new("app.dll").with_debug_identifier("ABCDEF123")
    }

    pub fn place(root: &Path, contents: &[u8]) -> PathBuf {
        let path = root.join("app.pdb").join("ABCDEF123").join("app.sym");
        ensure_parents(&path).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn cached_file_is_found_without_network() {
        let root = tempfile::tempdir().unwrap();
        let expected = place(root.path(), b"MODULE windows x86_64 ABCDEF123 app.pdb\n");

        let cache = cache(FakeFetcher::default(), FakeConverter::default());
        let result = cache.symbol_file(&module(), [root.path()]);

        assert_eq!(result, SymbolResult::Found(expected));
        assert!(cache.fetcher().requests().is_empty());
        assert!(cache.converter().calls().is_empty());
    }

    #[test]
    fn end_to_end_layout() {
        let root = tempfile::tempdir().unwrap();
        place(root.path(), b"MODULE\n");

        let module = ModuleIdentity::new("app.dll")
            .with_debug_file("")
            .with_debug_identifier("ABCDEF123");

        let cache = cache(FakeFetcher::default(), FakeConverter::default());
        assert_eq!(
            cache.symbol_file(&module, [root.path()]),
            SymbolResult::Found(root.path().join("app.pdb/ABCDEF123/app.sym"))
        );
        assert!(cache.fetcher().requests().is_empty());
    }

    #[test]
    fn exhausted_roots_are_not_found() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        let cache = cache(FakeFetcher::default(), FakeConverter::default());
        let result = cache.symbol_file(&module(), [first.path(), second.path()]);

        assert_eq!(result, SymbolResult::NotFound);
        assert_eq!(
            cache.fetcher().requests(),
            [
                "http://symbols.test/download/symbols/app.pdb/ABCDEF123/app.pdb",
                "http://symbols.test/download/symbols/app.pdb/ABCDEF123/app.pdb",
            ]
        );
        assert!(cache.converter().calls().is_empty());
    }

    #[test]
    fn no_roots_are_not_found() {
        let cache = cache(FakeFetcher::default(), FakeConverter::default());
        let roots: [&Path; 0] = [];

        assert_eq!(cache.symbol_file(&module(), roots), SymbolResult::NotFound);
    }

    #[test]
    fn earlier_root_is_recovered_before_later_root_is_tried() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let expected = place(second.path(), b"MODULE\n");

        let cache = cache(FakeFetcher::default(), FakeConverter::default());
        let result = cache.symbol_file(&module(), [first.path(), second.path()]);

        assert_eq!(result, SymbolResult::Found(expected));
        assert_eq!(cache.fetcher().requests().len(), 1);
    }

    #[test]
    fn miss_is_downloaded_and_converted() {
        let root = tempfile::tempdir().unwrap();

        let cache = cache(FakeFetcher::serving(b"MSF 7.00"), FakeConverter::default());
        let result = cache.symbol_file(&module(), [root.path()]);

        let directory = root.path().join("app.pdb").join("ABCDEF123");
        assert_eq!(result, SymbolResult::Found(directory.join("app.sym")));
        assert_eq!(
            cache.converter().calls(),
            [(directory.join("app.pdb"), directory.join("app.sym"))]
        );

        let text = std::fs::read_to_string(directory.join("app.sym")).unwrap();
        assert!(text.ends_with("MSF 7.00"));
        assert!(!directory.join("app.pdb").exists());

        // A second lookup hits the cache.
        let result = cache.symbol_file(&module(), [root.path()]);
        assert!(result.is_found());
        assert_eq!(cache.fetcher().requests().len(), 1);
    }

    #[test]
    fn failed_conversion_keeps_raw_file() {
        let root = tempfile::tempdir().unwrap();

        let cache = cache(FakeFetcher::serving(b"MSF 7.00"), FakeConverter::failing());
        let result = cache.symbol_file(&module(), [root.path()]);

        let directory = root.path().join("app.pdb").join("ABCDEF123");
        assert_eq!(result, SymbolResult::NotFound);
        assert_eq!(std::fs::read(directory.join("app.pdb")).unwrap(), b"MSF 7.00");
        assert!(!directory.join("app.sym").exists());
    }

    #[test]
    fn unwritable_root_degrades_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("file");
        std::fs::write(&root, b"").unwrap();

        let cache = cache(FakeFetcher::serving(b"MSF 7.00"), FakeConverter::default());
        let result = cache.symbol_file(&module(), [&root]);

        assert_eq!(result, SymbolResult::NotFound);
        assert_eq!(cache.fetcher().requests().len(), 1);
    }

    #[test]
    fn unusable_identity_skips_root() {
        let root = tempfile::tempdir().unwrap();

        let cache = cache(FakeFetcher::default(), FakeConverter::default());
        let result = cache.symbol_file(&ModuleIdentity::new("a.b"), [root.path()]);

        assert_eq!(result, SymbolResult::NotFound);
        assert!(cache.fetcher().requests().is_empty());
    }

    #[test]
    fn escaping_identity_writes_nothing_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir(&root).unwrap();

        let outside = dir.path().join("evil").to_string_lossy().into_owned();
        for identifier in [outside.as_str(), "../escape", "../../escape"] {
            let module = ModuleIdentity::new("app.dll").with_debug_identifier(identifier);

            let cache = cache(FakeFetcher::serving(b"MSF 7.00"), FakeConverter::default());
            let result = cache.symbol_file(&module, [&root]);

            assert_eq!(result, SymbolResult::NotFound);
            assert!(cache.fetcher().requests().is_empty());
            assert!(cache.converter().calls().is_empty());
        }

        let entries = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect::<Vec<_>>();
        assert_eq!(entries, ["root"]);
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn version_replaces_missing_identifier_in_url() {
        let root = tempfile::tempdir().unwrap();
        let module = ModuleIdentity::new("lib.dll").with_version("10.0.1");

        let cache = cache(FakeFetcher::default(), FakeConverter::default())
            .with_server_url(Url::parse("https://mirror.test/").unwrap());
        cache.symbol_file(&module, [root.path()]);

        assert_eq!(
            cache.fetcher().requests(),
            ["https://mirror.test/lib.pdb/10.0.1/lib.pdb"]
        );
    }
}
