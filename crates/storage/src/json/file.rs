use std::io::{self, Write as _};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::document::Database;
use crate::repository::StorageError;

/// Read the document at `path`; `Ok(None)` when the file does not exist.
pub(crate) async fn read_document(path: &Path) -> Result<Option<Database>, StorageError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Database::from_json(&raw).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace the document at `path` by writing a uniquely named sibling temp
/// file and renaming it over the target.
pub(crate) async fn write_document(path: &Path, db: &Database) -> Result<(), StorageError> {
    let json = db.to_json()?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic(&path, json.as_bytes()))
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_leaves_no_temp_files_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flashcards.json");

        write_document(&path, &Database::seed()).await.unwrap();
        write_document(&path, &Database::seed()).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("flashcards.json")]);
        assert_eq!(read_document(&path).await.unwrap(), Some(Database::seed()));
    }

    #[tokio::test]
    async fn write_under_a_regular_file_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = write_document(&blocker.join("flashcards.json"), &Database::seed())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
