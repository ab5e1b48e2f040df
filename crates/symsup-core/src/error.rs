/// Error type for module identity handling and path derivation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error occurred while parsing an executable image.
    #[error(transparent)]
    Object(#[from] object::Error),

    /// The image is not a PE32 or PE32+ file.
    #[error("Unsupported image format {0:?}")]
    UnsupportedFormat(object::FileKind),

    /// The image carries no CodeView record.
    #[error("CodeView not found")]
    CodeViewNotFound,

    /// Neither a debug file nor a usable code file name is available.
    #[error("Can't construct symbol file path without debug file (code file = {code_file:?})")]
    MissingDebugFile {
        /// The code file of the module.
        code_file: String,
    },

    /// A debug file name or identifier can't be used as a directory name.
    #[error("Unusable path segment {segment:?} (code file = {code_file:?})")]
    InvalidSegment {
        /// The code file of the module.
        code_file: String,

        /// The offending segment.
        segment: String,
    },
}
