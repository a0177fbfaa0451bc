//! JSON file adapter for the schema repository port.
//!
//! The schema is stored as pretty-printed JSON. Writes go to a hidden
//! temporary file in the same directory which is synced and then renamed over
//! the target, so readers never observe a partial document. File system
//! access goes through `cap-std` and runs on the blocking thread pool.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

use crate::domain::Schema;
use crate::domain::ports::{SchemaRepository, SchemaRepositoryError};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Schema repository persisting to a single JSON file.
#[derive(Debug, Clone)]
pub struct FileSchemaRepository {
    directory: PathBuf,
    file_name: String,
}

impl FileSchemaRepository {
    /// Repository backed by the file at `path`. The parent directory is
    /// created on the first save.
    ///
    /// # Errors
    /// Returns [`SchemaRepositoryError::Io`] when `path` has no UTF-8 file
    /// name.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SchemaRepositoryError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                SchemaRepositoryError::io(format!(
                    "schema path {} must name a file",
                    path.display()
                ))
            })?
            .to_owned();
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            directory,
            file_name,
        })
    }

    /// Full path of the backing file.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, SchemaRepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(PathBuf, String) -> Result<T, SchemaRepositoryError> + Send + 'static,
    {
        let directory = self.directory.clone();
        let file_name = self.file_name.clone();
        tokio::task::spawn_blocking(move || op(directory, file_name))
            .await
            .map_err(|err| SchemaRepositoryError::io(format!("schema I/O task failed: {err}")))?
    }
}

#[async_trait]
impl SchemaRepository for FileSchemaRepository {
    async fn load(&self) -> Result<Option<Schema>, SchemaRepositoryError> {
        self.blocking(|directory, file_name| {
            let dir = match Dir::open_ambient_dir(&directory, ambient_authority()) {
                Ok(dir) => dir,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(err) => return Err(io_error(&directory, err)),
            };
            let contents = match dir.read_to_string(&file_name) {
                Ok(contents) => contents,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(err) => return Err(io_error(&directory.join(&file_name), err)),
            };
            serde_json::from_str(&contents)
                .map(Some)
                .map_err(|err| SchemaRepositoryError::serialization(err.to_string()))
        })
        .await
    }

    async fn save(&self, schema: &Schema) -> Result<(), SchemaRepositoryError> {
        let contents = serde_json::to_string_pretty(schema)
            .map_err(|err| SchemaRepositoryError::serialization(err.to_string()))?;
        self.blocking(move |directory, file_name| {
            Dir::create_ambient_dir_all(&directory, ambient_authority())
                .map_err(|err| io_error(&directory, err))?;
            let dir = Dir::open_ambient_dir(&directory, ambient_authority())
                .map_err(|err| io_error(&directory, err))?;
            write_atomic(&dir, &file_name, &contents)
                .map_err(|err| io_error(&directory.join(&file_name), err))?;
            debug!(path = %directory.join(&file_name).display(), "schema written");
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<(), SchemaRepositoryError> {
        self.blocking(|directory, file_name| {
            let dir = match Dir::open_ambient_dir(&directory, ambient_authority()) {
                Ok(dir) => dir,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(err) => return Err(io_error(&directory, err)),
            };
            match dir.remove_file(&file_name) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(io_error(&directory.join(&file_name), err)),
            }
        })
        .await
    }
}

fn io_error(path: &Path, err: io::Error) -> SchemaRepositoryError {
    SchemaRepositoryError::io(format!("{}: {err}", path.display()))
}

fn write_atomic(dir: &Dir, file_name: &str, contents: &str) -> io::Result<()> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{file_name}.tmp.{}.{counter}", std::process::id());

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let written = dir.open_with(&tmp_name, &options).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    });
    if let Err(err) = written.and_then(|()| replace(dir, &tmp_name, file_name)) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }

    // Directory sync is best effort.
    drop(dir.open(".").and_then(|parent| parent.sync_all()));
    Ok(())
}

#[cfg(windows)]
fn replace(dir: &Dir, tmp_name: &str, file_name: &str) -> io::Result<()> {
    match dir.remove_file(file_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, file_name)
}

#[cfg(not(windows))]
fn replace(dir: &Dir, tmp_name: &str, file_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, file_name)
}
