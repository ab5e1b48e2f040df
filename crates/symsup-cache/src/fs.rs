use std::path::Path;

/// Creates every missing ancestor directory of `path`.
///
/// Directories that already exist are left alone, so repeated calls are
/// no-ops. Fails on the first directory that can't be created for any other
/// reason, e.g. missing permissions or a regular file in the way.
pub fn ensure_parents(path: impl AsRef<Path>) -> std::io::Result<()> {
    let parent = match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(()),
    };

    std::fs::create_dir_all(parent).inspect_err(|err| {
        tracing::error!(%err, path = %parent.display(), "creating directory failed");
    })
}
