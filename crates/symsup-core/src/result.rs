/// Outcome of a symbol lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolResult<T> {
    /// The symbol file was located; carries the requested view of it.
    Found(T),

    /// No symbol file exists for the module in any search root.
    NotFound,

    /// A local, unrecoverable condition stopped the lookup.
    ///
    /// Unlike [`NotFound`], this should usually abort batch processing.
    ///
    /// [`NotFound`]: Self::NotFound
    Interrupt,
}

impl<T> SymbolResult<T> {
    /// Returns `true` if the symbol file was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns the found value, if any.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the found value, keeping the other outcomes.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SymbolResult<U> {
        match self {
            Self::Found(value) => SymbolResult::Found(f(value)),
            Self::NotFound => SymbolResult::NotFound,
            Self::Interrupt => SymbolResult::Interrupt,
        }
    }

    /// Chains another lookup step onto the found value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> SymbolResult<U>) -> SymbolResult<U> {
        match self {
            Self::Found(value) => f(value),
            Self::NotFound => SymbolResult::NotFound,
            Self::Interrupt => SymbolResult::Interrupt,
        }
    }
}
