use std::path::Path;

use object::{
    FileKind, Object,
    read::pe::{ImageNtHeaders, PeFile, PeFile32, PeFile64},
};

use crate::{Error, ModuleIdentity, module::strip_pathname};

impl ModuleIdentity {
    /// Builds the identity of a PE image from its CodeView record.
    ///
    /// The debug identifier uses the Breakpad form: the PDB GUID as
    /// uppercase hex followed by the PDB age.
    pub fn from_pe<Pe>(code_file: impl Into<String>, pe: &PeFile<Pe>) -> Result<Self, Error>
    where
        Pe: ImageNtHeaders,
    {
        let cv = match pe.pdb_info()? {
            Some(cv) => cv,
            None => return Err(Error::CodeViewNotFound),
        };

        let debug_file = String::from_utf8_lossy(cv.path());

        Ok(Self {
            code_file: code_file.into(),
            debug_file: strip_pathname(&debug_file).to_owned(),
            debug_identifier: breakpad_identifier(cv.guid(), cv.age()),
            version: String::new(),
        })
    }

    /// Reads a PE32 or PE32+ image from disk and builds its identity.
    ///
    /// The code file is the file name of `path`.
    pub fn from_pe_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;

        let code_file = match path.file_name() {
            Some(file_name) => file_name.to_string_lossy().into_owned(),
            None => path.to_string_lossy().into_owned(),
        };

        match FileKind::parse(&data[..])? {
            FileKind::Pe32 => Self::from_pe(code_file, &PeFile32::parse(&data[..])?),
            FileKind::Pe64 => Self::from_pe(code_file, &PeFile64::parse(&data[..])?),
            kind => Err(Error::UnsupportedFormat(kind)),
        }
    }
}

/// Formats a PDB GUID and age as a Breakpad debug identifier.
///
/// The first three GUID fields are stored little-endian; the identifier
/// prints them as numbers, followed by the remaining eight bytes and the
/// age in uppercase hex without padding.
fn breakpad_identifier(guid: [u8; 16], age: u32) -> String {
    let data1 = u32::from_le_bytes([guid[0], guid[1], guid[2], guid[3]]);
    let data2 = u16::from_le_bytes([guid[4], guid[5]]);
    let data3 = u16::from_le_bytes([guid[6], guid[7]]);
    let data4 = guid[8..]
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<String>();

    format!("{data1:08X}{data2:04X}{data3:04X}{data4}{age:X}")
}
