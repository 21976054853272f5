//! Per-project write locks and atomic snapshot replacement
//!
//! A project has at most one writer at a time: [`ProjectStore::update`]
//! holds the project's lock file for the whole load, mutate, save cycle,
//! and snapshots are replaced with a temp file plus rename.
//!
//! [`ProjectStore::update`]: crate::store::ProjectStore::update

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::debug;

use crate::error::{Error, Result};

/// How long a command waits for a busy project before giving up
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Exclusive hold on a project's lock file, released on drop
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Block until the lock at `path` is ours or `timeout_ms` runs out.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        let mut waited = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(FileLock { file }),
                Err(err) if is_contended(&err) => {
                    if Instant::now() >= deadline {
                        return Err(Error::LockFailed(path.to_path_buf()));
                    }
                    if !waited {
                        debug!(lock = %path.display(), "project busy, waiting");
                        waited = true;
                    }
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(err) => return Err(Error::Io(err)),
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Replace `path` with `data` so readers never see a partial snapshot.
///
/// Does not lock; callers hold the project's [`FileLock`].
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = dir.join(format!(".{}.tmp.{}", file_name, std::process::id()));

    let mut temp = File::create(&temp_path)?;
    temp.write_all(data)?;
    temp.sync_all()?;
    drop(temp);

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::Io(err));
    }
    Ok(())
}
