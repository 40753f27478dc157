//! Writing a finished payload into the download folder

use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Write `bytes` to `dir/filename` and return the final path.
///
/// The data goes to a temp file in `dir` first and is only given its name once
/// fully written; a failure leaves nothing behind. An existing file is never
/// overwritten: `name (1).ext`, `name (2).ext`, ... are tried instead.
pub fn save_payload(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| Error::Save { path, source }
    };

    std::fs::create_dir_all(dir).map_err(io_err(dir))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err(dir))?;
    tmp.write_all(bytes).map_err(io_err(tmp.path()))?;
    tmp.flush().map_err(io_err(tmp.path()))?;

    let mut attempt = 0u32;
    loop {
        let target = dir.join(numbered(filename, attempt));
        match tmp.persist_noclobber(&target) {
            Ok(_) => {
                info!(path = %target.display(), len = bytes.len(), "saved");
                return Ok(target);
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                tmp = e.file;
                attempt += 1;
            }
            Err(e) => return Err(io_err(target.as_path())(e.error)),
        }
    }
}

fn numbered(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    let path = Path::new(filename);
    match (path.file_stem().and_then(|s| s.to_str()), path.extension().and_then(|e| e.to_str())) {
        (Some(stem), Some(ext)) => format!("{stem} ({attempt}).{ext}"),
        _ => format!("{filename} ({attempt})"),
    }
}
