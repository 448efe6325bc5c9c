// src/fs/mock.rs

use super::FileSystem;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEntry {
    File { data: Vec<u8>, executable: bool },
    Dir,
}

/// In-memory filesystem.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the other. Every `write` is counted; `fail_writes` makes
/// subsequent writes fail with `PermissionDenied`.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<PathBuf, MockEntry>,
    writes: usize,
    fail_writes: bool,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut inner = self.lock();
        insert_file(&mut inner.entries, path.as_ref(), content.into());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut inner = self.lock();
        insert_dir(&mut inner.entries, path.as_ref());
    }

    pub fn entry(&self, path: impl AsRef<Path>) -> Option<MockEntry> {
        self.lock().entries.get(path.as_ref()).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.lock()
            .entries
            .values()
            .filter(|e| matches!(e, MockEntry::File { .. }))
            .count()
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking test must not poison every later assertion.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn insert_file(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path, data: Vec<u8>) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            insert_dir(entries, parent);
        }
    }
    let executable = matches!(
        entries.get(path),
        Some(MockEntry::File { executable: true, .. })
    );
    entries.insert(path.to_path_buf(), MockEntry::File { data, executable });
}

fn insert_dir(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        entries
            .entry(ancestor.to_path_buf())
            .or_insert(MockEntry::Dir);
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {path:?}"))
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.lock().entries.get(path) {
            Some(MockEntry::File { data, .. }) => Ok(data.clone()),
            Some(MockEntry::Dir) => Err(io::Error::other(format!("is a directory: {path:?}"))),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write denied: {path:?}"),
            ));
        }
        inner.writes += 1;
        insert_file(&mut inner.entries, path, contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("mkdir denied: {path:?}"),
            ));
        }
        insert_dir(&mut inner.entries, path);
        Ok(())
    }

    fn set_owner_executable(&self, path: &Path) -> io::Result<()> {
        match self.lock().entries.get_mut(path) {
            Some(MockEntry::File { executable, .. }) => {
                *executable = true;
                Ok(())
            }
            _ => Err(not_found(path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let inner = self.lock();
        match inner.entries.get(path) {
            Some(MockEntry::Dir) => Ok(inner
                .entries
                .keys()
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect()),
            _ => Err(not_found(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_creates_parent_dirs() {
        let fs = MockFileSystem::new();
        fs.add_file("/root/a/b.txt", "x");

        assert!(fs.is_dir(Path::new("/root/a")));
        assert!(fs.is_dir(Path::new("/root")));
        assert_eq!(
            fs.read_dir(Path::new("/root/a")).unwrap(),
            vec![PathBuf::from("/root/a/b.txt")]
        );
    }

    #[test]
    fn failing_writes_leave_no_file() {
        let fs = MockFileSystem::new();
        fs.fail_writes(true);
        let err = fs.write(Path::new("/x"), b"data").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(!fs.exists(Path::new("/x")));
        assert_eq!(fs.write_count(), 0);
    }
}
