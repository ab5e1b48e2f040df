//! # Symbol supplier for crash analysis
//!
//! The `symsup` crate locates Breakpad symbol files (`.sym`) for the modules
//! of a crashed process. Symbols are looked up in a list of local search
//! roots; when a root has no symbol file yet, the raw debug database is
//! downloaded from a symbol server, converted with `dump_syms`, and stored
//! under that root.
//!
//! ## Features
//!
//! - **Deterministic Layout:** Symbol files live at
//!   `<root>/<debug file>/<identifier>/<name>.sym`, the layout used by
//!   Breakpad symbol stores and Microsoft symbol servers alike.
//!
//! - **Fallback Heuristics:** Modules without a debug file name get one
//!   derived from their code file (`foo.dll` becomes `foo.pdb`), and the
//!   module version stands in for a missing debug identifier.
//!
//! - **Automated Download and Conversion:** Missing symbols are downloaded
//!   from a symbol server and converted by an external executable, run
//!   through a compatibility layer (`wine`) where needed.
//!
//! - **Owned Buffers:** Symbol data can be handed out as reference-counted,
//!   NUL-terminated buffers tracked per module until released.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use symsup::{ModuleIdentity, SymbolResult, cache::SymbolSupplier};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let supplier = SymbolSupplier::new()?;
//!
//! // You can also read the identity from the image itself:
//! // let module = ModuleIdentity::from_pe_path("path/to/app.dll")?;
//! let module = ModuleIdentity::new("app.dll")
//!     .with_debug_file("app.pdb")
//!     .with_debug_identifier("ABCDEF0123456789ABCDEF01234567891");
//!
//! match supplier.symbol_file(&module, ["/var/cache/symbols"]) {
//!     SymbolResult::Found(path) => println!("symbols at {}", path.display()),
//!     SymbolResult::NotFound => println!("no symbols"),
//!     SymbolResult::Interrupt => return Err("interrupted".into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # License
//!
//! This project is licensed under the MIT license.

pub use symsup_core::*;

#[cfg(feature = "cache")]
pub mod cache {
    //! Symbol file cache and supplier.

    pub use symsup_cache::*;
}

// Re-export the `SymbolSupplier` to the root of the crate.
#[cfg(feature = "cache")]
#[doc(inline)]
pub use self::cache::SymbolSupplier;

#[cfg(feature = "dl")]
pub mod download {
    //! Symbol server downloads.

    pub use symsup_dl::*;
}

#[cfg(feature = "convert")]
pub mod convert {
    //! Conversion of raw debug databases into symbol files.

    pub use symsup_convert::*;
}
