//! Dataset file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Kind of dataset file, decided by extension (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFileKind {
    Csv,
    Parquet,
}

impl DatasetFileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str())?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else if ext.eq_ignore_ascii_case("parquet") {
            Some(Self::Parquet)
        } else {
            None
        }
    }
}

/// Lists every `.csv` and `.parquet` file under `dir`, recursively.
///
/// Returns files sorted by path so repeated runs concatenate in the same order.
pub fn list_dataset_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| IngestError::DirectoryRead {
            path: current.clone(),
            source: e,
        })?;
        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: current.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if DatasetFileKind::from_path(&path).is_some() {
                files.push(path);
            }
        }
    }
    if files.is_empty() {
        return Err(IngestError::NoDatasetFiles {
            path: dir.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn finds_nested_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("day2")).unwrap();
        fs::write(dir.path().join("day2").join("b.parquet"), b"").unwrap();
        fs::write(dir.path().join("a.CSV"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let files = list_dataset_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("a.CSV"), PathBuf::from("day2").join("b.parquet")]
        );
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_dataset_files(dir.path()).unwrap_err();
        assert!(matches!(err, IngestError::NoDatasetFiles { .. }));
        assert!(matches!(
            list_dataset_files(&dir.path().join("absent")),
            Err(IngestError::DirectoryNotFound { .. })
        ));
    }
}
