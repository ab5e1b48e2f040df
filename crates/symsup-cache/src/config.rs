use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use symsup_convert::{DEFAULT_CONVERTER, DumpSyms, default_wrapper};
use symsup_dl::DEFAULT_SERVER_URL;

use crate::Error;

/// Configuration of a [`SymbolSupplier`].
///
/// Every field is optional in the serialized form and falls back to its
/// default.
///
/// ```json
/// {
///     "roots": ["/var/cache/symbols", "/mnt/shared/symbols"],
///     "server_url": "http://msdl.microsoft.com/download/symbols",
///     "converter": { "program": "dump_syms.exe", "wrapper": "wine" }
/// }
/// ```
///
/// [`SymbolSupplier`]: crate::SymbolSupplier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierConfig {
    /// Local search roots, in priority order.
    pub roots: Vec<PathBuf>,

    /// Base URL of the symbol server.
    pub server_url: String,

    /// Converter settings.
    pub converter: ConverterConfig,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            server_url: DEFAULT_SERVER_URL.to_owned(),
            converter: ConverterConfig::default(),
        }
    }
}

impl SupplierConfig {
    /// Reads the configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Parses the configuration from JSON text.
    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(slice)?)
    }
}

/// Converter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Converter executable.
    pub program: PathBuf,

    /// Compatibility layer the converter is launched through.
    ///
    /// Defaults to `wine` on Linux hosts. An explicit `null` disables it.
    pub wrapper: Option<PathBuf>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_CONVERTER),
            wrapper: default_wrapper(),
        }
    }
}

impl From<&ConverterConfig> for DumpSyms {
    fn from(config: &ConverterConfig) -> Self {
        DumpSyms::builder()
            .program(config.program.clone())
            .maybe_wrapper(config.wrapper.clone())
            .build()
    }
}
