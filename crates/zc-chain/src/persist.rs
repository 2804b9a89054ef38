//! Whole-file persistence of the chain document.
//!
//! The document is `{ "entries": [...] }`, pretty-printed with two-space
//! indentation. Every save rewrites the entire file.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::chain::ChainError;
use crate::types::Entry;

#[derive(Serialize)]
struct ChainDocumentRef<'a> {
    entries: &'a [Entry],
}

#[derive(Deserialize)]
struct ChainDocument {
    #[serde(default)]
    entries: Option<Vec<Entry>>,
}

/// Load the entries stored at `path`.
///
/// A missing file yields an empty sequence. Any other read failure or a
/// malformed document is an error; nothing is partially loaded.
pub fn load_entries<P: AsRef<Path>>(path: P) -> Result<Vec<Entry>, ChainError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ChainError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let document: ChainDocument =
        serde_json::from_str(&contents).map_err(|source| ChainError::Deserialization {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(document.entries.unwrap_or_default())
}

/// Write `entries` to `path`, replacing whatever was there.
///
/// The parent directory is created if needed. On unix the directory is
/// created `0700` and the file `0600`.
pub fn save_entries<P: AsRef<Path>>(path: P, entries: &[Entry]) -> Result<(), ChainError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&ChainDocumentRef { entries })?;
    let io_err = |source| ChainError::Io {
        path: path.to_path_buf(),
        source,
    };
    ensure_parent_dir(path).map_err(io_err)?;
    write_private(path, json.as_bytes()).map_err(io_err)?;
    Ok(())
}

/// Create the directory that will hold `path`, if it has one.
pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o700);
            }
            builder.create(dir)
        }
        _ => Ok(()),
    }
}

fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.flush()
}
