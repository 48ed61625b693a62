use std::{collections::HashMap, io, sync::Arc};

use tokio::sync::Mutex;

use crate::ArcPath;

/// Mock implementation of the filesystem actor for testing purposes.
///
/// Files live in a single in-memory map keyed by path. Directories are not
/// modeled; `mkdir` always succeeds and `read_dir` lists files whose parent
/// matches the given path.
#[derive(Debug, Clone)]
pub struct Mock {
    files: Arc<Mutex<HashMap<ArcPath, Vec<u8>>>>,
}

fn not_found() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "file not found")
}

impl Mock {
    pub fn empty() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn read(&self, path: ArcPath) -> io::Result<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(&path).cloned().ok_or_else(not_found)
    }

    pub async fn read_to_string(&self, path: ArcPath) -> io::Result<String> {
        let bytes = self.read(path).await?;
        String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub async fn write(&self, path: ArcPath, contents: Vec<u8>) -> io::Result<()> {
        let mut files = self.files.lock().await;
        files.insert(path, contents);
        Ok(())
    }

    pub async fn append(&self, path: ArcPath, contents: Vec<u8>) -> io::Result<()> {
        let mut files = self.files.lock().await;
        files.entry(path).or_default().extend_from_slice(&contents);
        Ok(())
    }

    pub async fn remove_file(&self, path: ArcPath) -> io::Result<()> {
        let mut files = self.files.lock().await;
        files.remove(&path).map(|_| ()).ok_or_else(not_found)
    }

    pub async fn mkdir(&self, _path: ArcPath) -> io::Result<()> {
        Ok(())
    }

    pub async fn read_dir(&self, path: ArcPath) -> io::Result<Vec<ArcPath>> {
        let files = self.files.lock().await;
        Ok(files
            .keys()
            .filter(|p| p.parent() == Some(&*path))
            .cloned()
            .collect())
    }

    pub async fn size(&self, path: ArcPath) -> io::Result<u64> {
        let files = self.files.lock().await;
        files
            .get(&path)
            .map(|c| c.len() as u64)
            .ok_or_else(not_found)
    }
}
