//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Read a file as UTF-8 text.
///
/// Missing files and undecodable content both surface as `file.read_failed`,
/// with the decode position in the message for the latter.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::file_read_failed(path, "file not found")
        } else {
            Error::file_read_failed(path, e.to_string())
        }
    })?;

    String::from_utf8(bytes).map_err(|e| {
        Error::file_read_failed(
            path,
            format!(
                "not valid UTF-8 (invalid byte at offset {})",
                e.utf8_error().valid_up_to()
            ),
        )
    })
}

/// Write content to file atomically (write to a fresh temp sibling, then rename).
///
/// The temp file is uniquely named, so no existing file besides `path` is ever
/// touched. An existing target keeps its permissions.
pub fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Err(Error::file_write_failed(path, None, "path has no parent directory")),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".treepatch-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| Error::file_write_failed(path, None, format!("create temp: {}", e)))?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())
            .map_err(|e| Error::file_write_failed(path, None, format!("copy permissions: {}", e)))?;
    }

    tmp.write_all(content.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| Error::file_write_failed(path, None, format!("write temp: {}", e)))?;

    // A failed persist drops the temp file, which removes it.
    tmp.persist(path)
        .map_err(|e| Error::file_write_failed(path, None, format!("rename temp: {}", e.error)))?;

    Ok(())
}

/// Create `path` and write `content`, failing if the path already exists.
pub fn write_new(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(content)?;
    file.sync_all()
}
