// Reads the `.txt` files that make up one upload batch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::FileRecord;

pub const TEXT_EXTENSION: &str = ".txt";

/// Failures that abort the whole batch before any network call.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("directory {} does not exist", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("no .txt files found in {}", .0.display())]
    NoTextFiles(PathBuf),
    #[error("failed to list {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Per-file outcome reported while a batch is being read.
#[derive(Debug)]
pub enum FileEvent<'a> {
    Read { file_name: &'a str, chars: usize },
    Skipped { file_name: &'a str, error: &'a io::Error },
}

/// Reads every `.txt` file directly inside `dir`, in directory listing
/// order. A file that cannot be read as UTF-8 is reported through
/// `on_event` and left out of the result; it does not fail the batch.
pub fn read_txt_files(
    dir: &Path,
    mut on_event: impl FnMut(FileEvent<'_>),
) -> Result<Vec<FileRecord>, SourceError> {
    if !dir.exists() {
        return Err(SourceError::DirectoryNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(SourceError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|source| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        // Non UTF-8 names can't carry a `.txt` suffix we can compare against.
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(TEXT_EXTENSION) {
                names.push(name.to_string());
            }
        }
    }

    if names.is_empty() {
        return Err(SourceError::NoTextFiles(dir.to_path_buf()));
    }

    let mut records = Vec::with_capacity(names.len());
    for file_name in names {
        match fs::read_to_string(dir.join(&file_name)) {
            Ok(text) => {
                on_event(FileEvent::Read {
                    file_name: &file_name,
                    chars: text.chars().count(),
                });
                records.push(FileRecord { file_name, text });
            }
            Err(error) => {
                tracing::warn!(file = %file_name, %error, "skipping unreadable file");
                on_event(FileEvent::Skipped {
                    file_name: &file_name,
                    error: &error,
                });
            }
        }
    }
    Ok(records)
}
