//! Module identities and the on-disk layout of converted symbol files.

mod codeview;
mod error;
mod module;
mod paths;
mod result;

pub use self::{
    error::Error,
    module::{ModuleIdentity, strip_pathname},
    paths::{RAW_EXTENSION, SYMBOL_EXTENSION, SymbolPaths},
    result::SymbolResult,
};
