//! Convert raw debug databases into Breakpad symbol files.

mod error;

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

pub use self::error::Error;

/// Default converter executable.
pub const DEFAULT_CONVERTER: &str = "dump_syms.exe";

/// Default compatibility layer for running [`DEFAULT_CONVERTER`] on Linux.
pub const DEFAULT_WRAPPER: &str = "wine";

/// Converts a raw debug database into a symbol file.
pub trait Converter {
    /// The error type for failed conversions.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Converts `raw_file`, writing the result to `symbol_file`.
    fn convert(&self, raw_file: &Path, symbol_file: &Path) -> Result<(), Self::Error>;
}

/// Runs an external `dump_syms`-style executable.
///
/// The executable receives the raw file as its only argument and its
/// standard output is captured into a temporary file next to the symbol
/// file. A zero exit code means success, and only then is the output renamed
/// into place, so an existing symbol file is always a complete one. When a wrapper is configured, the executable is launched through
/// it (`wine dump_syms.exe <raw>`).
#[derive(Debug, Clone, bon::Builder)]
pub struct DumpSyms {
    /// Converter executable.
    #[builder(into, default = PathBuf::from(DEFAULT_CONVERTER))]
    program: PathBuf,

    /// Compatibility layer the executable is launched through.
    #[builder(into)]
    wrapper: Option<PathBuf>,
}

impl Default for DumpSyms {
    /// `dump_syms.exe`, through `wine` on Linux hosts.
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_CONVERTER),
            wrapper: default_wrapper(),
        }
    }
}

impl DumpSyms {
    /// Returns the converter executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the compatibility layer, if any.
    pub fn wrapper(&self) -> Option<&Path> {
        self.wrapper.as_deref()
    }

    fn command(&self) -> Command {
        match &self.wrapper {
            Some(wrapper) => {
                let mut command = Command::new(wrapper);
                command.arg(&self.program);
                command
            }
            None => Command::new(&self.program),
        }
    }
}

impl Converter for DumpSyms {
    type Error = Error;

    fn convert(&self, raw_file: &Path, symbol_file: &Path) -> Result<(), Error> {
        let directory = match symbol_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Removed on drop unless persisted.
        let output = tempfile::Builder::new()
            .prefix(".")
            .suffix(".sym.tmp")
            .tempfile_in(directory)?;

        let mut command = self.command();
        command
            .arg(raw_file)
            .stdin(Stdio::null())
            .stdout(output.as_file().try_clone()?);

        tracing::info!(?command, "converting");
        match command.status() {
            Ok(status) if status.success() => {}
            Ok(status) => return Err(Error::Failed(status)),
            Err(source) => {
                return Err(Error::Spawn {
                    program: self.wrapper.as_ref().unwrap_or(&self.program).clone(),
                    source,
                });
            }
        }

        output.persist(symbol_file).map_err(|err| err.error)?;
        Ok(())
    }
}

/// Returns the compatibility layer needed to run [`DEFAULT_CONVERTER`] on
/// this host.
pub fn default_wrapper() -> Option<PathBuf> {
    cfg!(target_os = "linux").then(|| PathBuf::from(DEFAULT_WRAPPER))
}
