//! JSON asset persistence shared by the blackboard and tree assets.
//!
//! Saving is all-or-nothing: the document is written to a temporary file next
//! to the target and renamed over it only once fully written.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to access asset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode asset {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AssetError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        AssetError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    let file = File::open(path).map_err(|e| AssetError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| AssetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AssetError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(|e| AssetError::io(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, value).map_err(|source| AssetError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(|e| AssetError::io(path, e))?;
        writer.flush().map_err(|e| AssetError::io(path, e))?;
    }
    tmp.persist(path).map_err(|e| AssetError::io(path, e.error))?;

    tracing::debug!(path = %path.display(), "asset saved");
    Ok(())
}
