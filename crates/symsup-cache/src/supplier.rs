use std::path::{Path, PathBuf};

use symsup_convert::{Converter, DumpSyms};
use symsup_core::{ModuleIdentity, SymbolResult};
use symsup_dl::{Fetcher, HttpFetcher};

use crate::{BufferTable, Error, SupplierConfig, SymbolBuffer, SymbolCache};

/// Path and text of a located symbol file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolData {
    /// Path of the symbol file.
    pub path: PathBuf,

    /// Entire contents of the symbol file.
    pub text: String,
}

/// Path and owned buffer of a located symbol file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedSymbolData {
    /// Path of the symbol file.
    pub path: PathBuf,

    /// NUL-terminated copy of the symbol file.
    pub buffer: SymbolBuffer,
}

/// Hands out symbol files as paths, text, or owned buffers.
///
/// Owned buffers are tracked per module code file until released with
/// [`free_symbol_data`]. The table is private to each supplier and safe to
/// share between threads.
///
/// [`free_symbol_data`]: Self::free_symbol_data
pub struct SymbolSupplier<F = HttpFetcher, C = DumpSyms>
where
    F: Fetcher,
    C: Converter,
{
    cache: SymbolCache<F, C>,
    buffers: BufferTable,
}

impl SymbolSupplier {
    /// Creates a supplier backed by [`SymbolCache::new`].
    pub fn new() -> Result<Self, Error> {
        Ok(Self::from_cache(SymbolCache::new()?))
    }

    /// Creates a supplier backed by [`SymbolCache::from_config`].
    pub fn from_config(config: &SupplierConfig) -> Result<Self, Error> {
        Ok(Self::from_cache(SymbolCache::from_config(config)?))
    }
}

impl<F, C> SymbolSupplier<F, C>
where
    F: Fetcher,
    C: Converter,
{
    /// Creates a supplier on top of an existing cache.
    pub fn from_cache(cache: SymbolCache<F, C>) -> Self {
        Self {
            cache,
            buffers: BufferTable::new(),
        }
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &SymbolCache<F, C> {
        &self.cache
    }

    /// Returns the table of outstanding owned buffers.
    pub fn buffers(&self) -> &BufferTable {
        &self.buffers
    }

    /// Locates the symbol file of `module`.
    pub fn symbol_file(
        &self,
        module: &ModuleIdentity,
        roots: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> SymbolResult<PathBuf> {
        self.cache.symbol_file(module, roots)
    }

    /// Locates the symbol file of `module` and reads it as text.
    ///
    /// Invalid UTF-8 sequences are replaced. A file that was located but
    /// can't be read yields [`SymbolResult::Interrupt`].
    pub fn symbol_data(
        &self,
        module: &ModuleIdentity,
        roots: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> SymbolResult<SymbolData> {
        self.symbol_file(module, roots).and_then(|path| {
            let data = match read(&path) {
                Some(data) => data,
                None => return SymbolResult::Interrupt,
            };

            let text = match String::from_utf8(data) {
                Ok(text) => text,
                Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
            };

            SymbolResult::Found(SymbolData { path, text })
        })
    }

    /// Locates the symbol file of `module` and returns an owned,
    /// NUL-terminated copy of its bytes.
    ///
    /// The buffer is also tracked under the module's code file, replacing
    /// any buffer tracked for it before. Failure to allocate the copy yields
    /// [`SymbolResult::Interrupt`].
    pub fn owned_symbol_data(
        &self,
        module: &ModuleIdentity,
        roots: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> SymbolResult<OwnedSymbolData> {
        self.symbol_file(module, roots).and_then(|path| {
            let data = match read(&path) {
                Some(data) => data,
                None => return SymbolResult::Interrupt,
            };

            let buffer = match SymbolBuffer::copy_from(&data) {
                Ok(buffer) => buffer,
                Err(err) => {
                    let size = data.len() + 1;
                    tracing::error!(%err, size, "memory allocation failed");
                    return SymbolResult::Interrupt;
                }
            };

            if self
                .buffers
                .insert(&module.code_file, buffer.clone())
                .is_some()
            {
                tracing::debug!(code_file = %module.code_file, "replaced symbol data buffer");
            }

            SymbolResult::Found(OwnedSymbolData { path, buffer })
        })
    }

    /// Stops tracking the owned buffer of `module`.
    ///
    /// Handles already given out stay valid. A missing module or a module
    /// without a tracked buffer is only logged.
    pub fn free_symbol_data(&self, module: Option<&ModuleIdentity>) {
        let module = match module {
            Some(module) => module,
            None => {
                tracing::info!("cannot free symbol data buffer for missing module");
                return;
            }
        };

        if self.buffers.remove(&module.code_file).is_none() {
            tracing::info!(
                code_file = %module.code_file,
                "cannot find symbol data buffer for module"
            );
        }
    }
}

fn read(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(data) => Some(data),
        Err(err) => {
            tracing::error!(%err, path = %path.display(), "failed to read symbol file");
            None
        }
    }
}
