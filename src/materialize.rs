// src/materialize.rs

//! Writing bundled files to disk.
//!
//! Materialization is idempotent: a file that already exists at the target
//! path is left untouched. Callers treat it as a startup precondition; two
//! concurrent materializations of the same directory are not coordinated.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::bundle::payload::digest_bytes;
use crate::bundle::{Bundle, CONFIG_FILES, EXECUTABLE_NAME, Payload};
use crate::errors::{Result, TorPrebuiltError};
use crate::fs::FileSystem;

/// Paths produced by [`materialize_bundle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedBundle {
    pub executable: PathBuf,
    pub work_dir: PathBuf,
}

/// Write `payload` as the executable inside `dir`, unless a file is already
/// there, and make it executable by its owner.
///
/// Returns the executable's path either way.
pub fn create<F>(fs: &F, payload: &Payload, dir: &Path) -> Result<PathBuf>
where
    F: FileSystem + ?Sized,
{
    let path = dir.join(EXECUTABLE_NAME);

    let io_err = |source| TorPrebuiltError::Materialize {
        path: path.clone(),
        source,
    };

    if fs.is_file(&path) {
        check_existing(fs, payload, &path);
        return Ok(path);
    }
    if fs.exists(&path) {
        return Err(io_err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "path exists but is not a regular file",
        )));
    }

    fs.create_dir_all(dir).map_err(io_err)?;
    fs.write(&path, payload.bytes()).map_err(io_err)?;
    fs.set_owner_executable(&path).map_err(io_err)?;

    info!(path = ?path, len = payload.len(), "materialized executable");
    Ok(path)
}

/// Warn when a previously materialized executable no longer matches the
/// payload. The file is kept as is.
fn check_existing<F>(fs: &F, payload: &Payload, path: &Path)
where
    F: FileSystem + ?Sized,
{
    match fs.read(path) {
        Ok(existing) => {
            let existing = digest_bytes(&existing);
            let expected = payload.digest();
            if existing == expected {
                debug!(path = ?path, "executable already materialized");
            } else {
                warn!(
                    path = ?path,
                    existing = %existing,
                    expected = %expected,
                    "existing executable differs from bundled payload; leaving it in place"
                );
            }
        }
        Err(e) => {
            debug!(path = ?path, error = %e, "could not read existing executable for comparison");
        }
    }
}

/// Write a whole bundle into `dir`.
///
/// - the executable goes through [`create`];
/// - each asset is written only if nothing exists at its path yet;
/// - `torrc-defaults` and `torrc` are created empty when still missing, so
///   `-f torrc --defaults-torrc torrc-defaults` always resolves.
pub fn materialize_bundle<F>(fs: &F, bundle: &Bundle, dir: &Path) -> Result<MaterializedBundle>
where
    F: FileSystem + ?Sized,
{
    let executable = create(fs, bundle.executable(), dir)?;

    for (rel, data) in bundle.assets() {
        write_if_absent(fs, &dir.join(rel), data.bytes())?;
    }

    for name in CONFIG_FILES {
        write_if_absent(fs, &dir.join(name), &[])?;
    }

    Ok(MaterializedBundle {
        executable,
        work_dir: dir.to_path_buf(),
    })
}

fn write_if_absent<F>(fs: &F, path: &Path, data: &[u8]) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    if fs.exists(path) {
        debug!(path = ?path, "file already present; skipping");
        return Ok(());
    }
    fs.write(path, data)
        .map_err(|source| TorPrebuiltError::Materialize {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = ?path, len = data.len(), "materialized file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{TORRC, TORRC_DEFAULTS};
    use crate::fs::mock::{MockEntry, MockFileSystem};

    #[test]
    fn create_writes_once_and_marks_executable() {
        let fs = MockFileSystem::new();
        let payload = Payload::from_static(b"\x7fELF");
        let dir = Path::new("/work");

        let first = create(&fs, &payload, dir).unwrap();
        let second = create(&fs, &payload, dir).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, dir.join(EXECUTABLE_NAME));
        assert_eq!(fs.write_count(), 1);
        assert_eq!(
            fs.entry(&first),
            Some(MockEntry::File {
                data: b"\x7fELF".to_vec(),
                executable: true
            })
        );
    }

    #[test]
    fn create_never_overwrites_a_different_file() {
        let fs = MockFileSystem::new();
        let dir = Path::new("/work");
        fs.add_file(dir.join(EXECUTABLE_NAME), "old");

        let path = create(&fs, &Payload::from("new"), dir).unwrap();

        assert_eq!(fs.read(&path).unwrap(), b"old");
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn create_rejects_a_directory_in_the_executables_place() {
        let fs = MockFileSystem::new();
        let dir = Path::new("/work");
        fs.add_dir(dir.join(EXECUTABLE_NAME));

        match create(&fs, &Payload::from("ELF"), dir) {
            Err(TorPrebuiltError::Materialize { path, source }) => {
                assert_eq!(path, dir.join(EXECUTABLE_NAME));
                assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
            }
            other => panic!("expected Materialize error, got {other:?}"),
        }
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn create_reports_write_failure_as_materialize_error() {
        let fs = MockFileSystem::new();
        fs.fail_writes(true);

        match create(&fs, &Payload::from("x"), Path::new("/ro")) {
            Err(TorPrebuiltError::Materialize { path, source }) => {
                assert_eq!(path, Path::new("/ro").join(EXECUTABLE_NAME));
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected Materialize error, got {other:?}"),
        }
    }

    #[test]
    fn bundle_fills_in_missing_config_files_only() {
        let fs = MockFileSystem::new();
        let dir = Path::new("/work");
        fs.add_file(dir.join(TORRC), "SocksPort 9150\n");

        let bundle = Bundle::new("ELF").with_asset("geoip", "GEO");
        let out = bundle.materialize(&fs, dir).unwrap();

        assert_eq!(out.work_dir, dir);
        assert_eq!(fs.read(&dir.join("geoip")).unwrap(), b"GEO");
        assert_eq!(fs.read(&dir.join(TORRC_DEFAULTS)).unwrap(), b"");
        assert_eq!(fs.read(&dir.join(TORRC)).unwrap(), b"SocksPort 9150\n");
        assert_eq!(fs.file_count(), 4);
    }
}
