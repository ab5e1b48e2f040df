use std::path::{Path, PathBuf};

use crate::{Error, ModuleIdentity};

/// Extension of converted symbol files.
pub const SYMBOL_EXTENSION: &str = "sym";

/// Extension of raw debug databases.
pub const RAW_EXTENSION: &str = "pdb";

/// On-disk locations of a module's symbol file under one search root.
///
/// The layout is `<root>/<debug file>/<identifier>/<stem>.sym`, with the raw
/// debug database downloaded next to it as `<stem>.pdb`. The identifier
/// directory is omitted when the module has neither a debug identifier nor
/// a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolPaths {
    /// Path segments below the root, up to and excluding the file name.
    segments: Vec<String>,

    /// File name of the symbol file without extension.
    stem: String,

    /// `<root>/<segments>/<stem>.sym`
    symbol_file: PathBuf,

    /// `<root>/<segments>/<stem>.pdb`
    raw_file: PathBuf,
}

impl SymbolPaths {
    /// Derives the paths of `module` below `root`.
    ///
    /// This is a pure function of its inputs. Every derived path stays below
    /// `root`: a debug file name or identifier that is empty, `.`, `..`, or
    /// contains a path separator is rejected.
    pub fn resolve(root: impl AsRef<Path>, module: &ModuleIdentity) -> Result<Self, Error> {
        let debug_file = match module.debug_file_name() {
            Some(debug_file) => debug_file,
            None => {
                return Err(Error::MissingDebugFile {
                    code_file: module.code_file.clone(),
                });
            }
        };

        let mut segments = vec![debug_file.to_string()];
        if let Some(disambiguator) = module.disambiguator() {
            segments.push(disambiguator.to_owned());
        }

        if let Some(segment) = segments.iter().find(|segment| !is_plain_segment(segment)) {
            return Err(Error::InvalidSegment {
                code_file: module.code_file.clone(),
                segment: segment.clone(),
            });
        }

        let stem = symbol_stem(&debug_file).to_owned();

        let directory = segments
            .iter()
            .fold(root.as_ref().to_path_buf(), |path, segment| path.join(segment));

        // <root>/foo.pdb/ABCDEF123/foo.sym
        let symbol_file = directory.join(format!("{stem}.{SYMBOL_EXTENSION}"));

        // <root>/foo.pdb/ABCDEF123/foo.pdb
        let raw_file = directory.join(format!("{stem}.{RAW_EXTENSION}"));

        Ok(Self {
            segments,
            stem,
            symbol_file,
            raw_file,
        })
    }

    /// Returns the path of the converted symbol file.
    pub fn symbol_file(&self) -> &Path {
        &self.symbol_file
    }

    /// Returns the path the raw debug database is downloaded to.
    pub fn raw_file(&self) -> &Path {
        &self.raw_file
    }

    /// Returns the raw file path relative to the root, one segment at a time.
    ///
    /// Symbol servers use the same layout, so these segments are appended to
    /// the server URL to locate the raw debug database.
    pub fn raw_segments(&self) -> impl Iterator<Item = String> + '_ {
        self.segments
            .iter()
            .cloned()
            .chain(std::iter::once(format!("{}.{RAW_EXTENSION}", self.stem)))
    }
}

/// Returns whether `segment` names a single entry inside its parent.
fn is_plain_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..") && !segment.contains(['/', '\\'])
}

/// Strips a case-insensitive `.pdb` extension, provided something is left.
fn symbol_stem(debug_file: &str) -> &str {
    const SUFFIX: &str = ".pdb";

    let split = debug_file.len().saturating_sub(SUFFIX.len());
    if split > 0
        && debug_file.is_char_boundary(split)
        && debug_file[split..].eq_ignore_ascii_case(SUFFIX)
    {
        return &debug_file[..split];
    }

    debug_file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_layout() {
        let module = ModuleIdentity::new("app.dll").with_debug_identifier("ABCDEF123");
        let paths = SymbolPaths::resolve("/cache", &module).unwrap();

        assert_eq!(
            paths.symbol_file(),
            Path::new("/cache/app.pdb/ABCDEF123/app.sym")
        );
        assert_eq!(
            paths.raw_file(),
            Path::new("/cache/app.pdb/ABCDEF123/app.pdb")
        );
        assert_eq!(
            paths.raw_segments().collect::<Vec<_>>(),
            ["app.pdb", "ABCDEF123", "app.pdb"]
        );
    }

    #[test]
    fn derived_debug_file() {
        let module = ModuleIdentity::new("foo.dll").with_version("1.0");
        let paths = SymbolPaths::resolve("/s", &module).unwrap();

        assert_eq!(paths.symbol_file(), Path::new("/s/foo.pdb/1.0/foo.sym"));
    }

    #[test]
    fn identifier_segment_is_optional() {
        let module = ModuleIdentity::new("foo.dll").with_debug_file("foo.pdb");
        let paths = SymbolPaths::resolve("/s", &module).unwrap();

        assert_eq!(paths.symbol_file(), Path::new("/s/foo.pdb/foo.sym"));
        assert_eq!(
            paths.raw_segments().collect::<Vec<_>>(),
            ["foo.pdb", "foo.pdb"]
        );
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let lower = ModuleIdentity::new("foo.dll")
            .with_debug_file("foo.pdb")
            .with_debug_identifier("1");
        let upper = lower.clone().with_debug_file("foo.PDB");

        let lower = SymbolPaths::resolve("/s", &lower).unwrap();
        let upper = SymbolPaths::resolve("/s", &upper).unwrap();

        assert_eq!(lower.symbol_file().file_name(), upper.symbol_file().file_name());
        assert_eq!(upper.symbol_file(), Path::new("/s/foo.PDB/1/foo.sym"));
    }

    #[test]
    fn foreign_extension_is_kept() {
        let module = ModuleIdentity::new("libfoo.so")
            .with_debug_file("libfoo.so.debug")
            .with_debug_identifier("42");
        let paths = SymbolPaths::resolve("/s", &module).unwrap();

        assert_eq!(
            paths.symbol_file(),
            Path::new("/s/libfoo.so.debug/42/libfoo.so.debug.sym")
        );
        assert_eq!(
            paths.raw_file(),
            Path::new("/s/libfoo.so.debug/42/libfoo.so.debug.pdb")
        );
    }

    #[test]
    fn bare_extension_is_not_stripped() {
        assert_eq!(symbol_stem(".pdb"), ".pdb");
        assert_eq!(symbol_stem("a.Pdb"), "a");
        assert_eq!(symbol_stem("ab"), "ab");
        assert_eq!(symbol_stem("é.pdb"), "é");
    }

    #[test]
    fn unusable_identity_is_rejected() {
        let module = ModuleIdentity::new("a.b");
        assert!(matches!(
            SymbolPaths::resolve("/s", &module),
            Err(Error::MissingDebugFile { code_file }) if code_file == "a.b"
        ));
    }

    #[test]
    fn escaping_identifiers_are_rejected() {
        for identifier in ["/tmp/evil", "../../etc", "..", ".", r"a\b", "a/b"] {
            let module = ModuleIdentity::new("app.dll").with_debug_identifier(identifier);
            assert!(
                matches!(
                    SymbolPaths::resolve("/cache", &module),
                    Err(Error::InvalidSegment { segment, .. }) if segment == identifier
                ),
                "{identifier:?} was accepted"
            );
        }

        let module = ModuleIdentity::new("app.dll").with_version("../1.0");
        assert!(SymbolPaths::resolve("/cache", &module).is_err());
    }

    #[test]
    fn escaping_debug_files_are_rejected() {
        for debug_file in ["..", ".", r"C:\symbols\..", "/tmp/.."] {
            let module = ModuleIdentity::new("app.dll")
                .with_debug_file(debug_file)
                .with_debug_identifier("ABCDEF123");
            assert!(
                matches!(
                    SymbolPaths::resolve("/cache", &module),
                    Err(Error::InvalidSegment { .. })
                ),
                "{debug_file:?} was accepted"
            );
        }
    }

    #[test]
    fn dotted_names_stay_below_root() {
        let module = ModuleIdentity::new("app.dll")
            .with_debug_file("..app.pdb")
            .with_debug_identifier("1.0.0");
        let paths = SymbolPaths::resolve("/cache", &module).unwrap();

        assert_eq!(
            paths.symbol_file(),
            Path::new("/cache/..app.pdb/1.0.0/..app.sym")
        );
        assert!(paths.raw_file().starts_with("/cache/..app.pdb"));
    }

    #[test]
    fn derivation_is_deterministic() {
        let module = ModuleIdentity::new(r"C:\Windows\System32\kernel32.dll")
            .with_debug_file("kernel32.pdb")
            .with_debug_identifier("0123456789ABCDEF0123456789ABCDEF1");

        assert_eq!(
            SymbolPaths::resolve("/s", &module).unwrap(),
            SymbolPaths::resolve("/s", &module).unwrap()
        );
    }
}
