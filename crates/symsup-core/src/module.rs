use std::borrow::Cow;

/// Identity of a binary module under analysis.
///
/// Only `code_file` is mandatory. The remaining fields are treated as absent
/// when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModuleIdentity {
    /// Name (or full path) of the original binary.
    pub code_file: String,

    /// Name (or full path) of the debug database.
    pub debug_file: String,

    /// Unique build identifier of the debug database.
    pub debug_identifier: String,

    /// Module version, used when no debug identifier is known.
    pub version: String,
}

impl ModuleIdentity {
    /// Creates a new identity with the given code file and nothing else.
    pub fn new(code_file: impl Into<String>) -> Self {
        Self {
            code_file: code_file.into(),
            ..Default::default()
        }
    }

    /// Sets the debug file name.
    pub fn with_debug_file(self, debug_file: impl Into<String>) -> Self {
        Self {
            debug_file: debug_file.into(),
            ..self
        }
    }

    /// Sets the debug identifier.
    pub fn with_debug_identifier(self, debug_identifier: impl Into<String>) -> Self {
        Self {
            debug_identifier: debug_identifier.into(),
            ..self
        }
    }

    /// Sets the version.
    pub fn with_version(self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self
        }
    }

    /// Returns the file name of the debug database.
    ///
    /// Directory components are stripped. When no debug file is known, the
    /// name is guessed from the code file by replacing its last three
    /// characters with `pdb` (`foo.dll` becomes `foo.pdb`). Returns `None`
    /// if neither source yields a name.
    pub fn debug_file_name(&self) -> Option<Cow<'_, str>> {
        let debug_file = strip_pathname(&self.debug_file);
        if !debug_file.is_empty() {
            return Some(Cow::Borrowed(debug_file));
        }

        let code_file = strip_pathname(&self.code_file);
        let length = code_file.chars().count();
        if length <= 3 {
            return None;
        }

        let (split, _) = code_file.char_indices().nth(length - 3)?;
        let debug_file = format!("{}pdb", &code_file[..split]);
        tracing::info!(%debug_file, code_file, "assuming debug file");
        Some(Cow::Owned(debug_file))
    }

    /// Returns the segment that disambiguates builds of the same debug file.
    ///
    /// This is the debug identifier, or the version if the identifier is
    /// empty, or `None` if both are empty.
    pub fn disambiguator(&self) -> Option<&str> {
        [&self.debug_identifier, &self.version]
            .into_iter()
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }
}

/// Returns the last component of a path, accepting both `/` and `\` as
/// separators regardless of the host platform.
pub fn strip_pathname(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(index) => &path[index + 1..],
        None => path,
    }
}
