use std::{
    collections::TryReserveError,
    ffi::CStr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use indexmap::IndexMap;

/// Owned, NUL-terminated copy of a symbol file's contents.
///
/// The handle is reference counted: clones share the same allocation, and
/// the memory is released when the last handle is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolBuffer(Arc<Vec<u8>>);

impl SymbolBuffer {
    /// Copies `data` into a new buffer of exactly `data.len() + 1` bytes,
    /// the last of which is a NUL terminator.
    ///
    /// Fails instead of aborting when the allocation can't be satisfied.
    pub fn copy_from(data: &[u8]) -> Result<Self, TryReserveError> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(data.len() + 1)?;
        buffer.extend_from_slice(data);
        buffer.push(0);

        Ok(Self(Arc::new(buffer)))
    }

    /// Returns the contents without the terminator.
    pub fn data(&self) -> &[u8] {
        &self.0[..self.0.len() - 1]
    }

    /// Returns the contents including the terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.0
    }

    /// Returns the contents as a C string, unless they contain a NUL byte.
    pub fn as_c_str(&self) -> Option<&CStr> {
        CStr::from_bytes_with_nul(&self.0).ok()
    }

    /// Returns the size of the buffer, terminator included.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if both handles share one allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Symbol buffers handed out to callers, keyed by module code file.
///
/// Holds at most one buffer per key. Inserting under an existing key
/// releases the previous buffer.
#[derive(Debug, Default)]
pub struct BufferTable {
    buffers: Mutex<IndexMap<String, SymbolBuffer>>,
}

impl BufferTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks `buffer` under `code_file`, returning the buffer it replaces.
    pub fn insert(&self, code_file: &str, buffer: SymbolBuffer) -> Option<SymbolBuffer> {
        self.lock().insert(code_file.to_owned(), buffer)
    }

    /// Stops tracking the buffer of `code_file`.
    pub fn remove(&self, code_file: &str) -> Option<SymbolBuffer> {
        self.lock().shift_remove(code_file)
    }

    /// Returns the tracked buffer of `code_file`.
    pub fn get(&self, code_file: &str) -> Option<SymbolBuffer> {
        self.lock().get(code_file).cloned()
    }

    /// Returns the number of tracked buffers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no buffer is tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, SymbolBuffer>> {
        // The map stays consistent even if a holder panicked.
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
