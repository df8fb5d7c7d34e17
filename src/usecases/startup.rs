use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use fs2::FileExt;

use crate::infra::{error::AppError, storage_layout::StorageLayout};

const SESSION_LOCK_ACQUIRED: &str = "SESSION_LOCK_ACQUIRED";

/// Exclusive claim on the session directory for the life of the process.
///
/// The lock is advisory and held on the open file, so the OS releases it
/// even if the process is killed.
#[derive(Debug)]
pub struct SessionLockGuard {
    path: PathBuf,
    file: File,
}

impl SessionLockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionLockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[derive(Debug)]
pub struct StartupPlan {
    pub lock_guard: SessionLockGuard,
    pub has_stored_session: bool,
}

pub fn plan_startup(layout: &StorageLayout) -> Result<StartupPlan, AppError> {
    layout.ensure_dirs()?;

    let lock_guard = acquire_session_lock(layout.session_lock_file())?;
    tracing::debug!(
        code = SESSION_LOCK_ACQUIRED,
        path = %lock_guard.path().display(),
        "session lock acquired"
    );

    Ok(StartupPlan {
        lock_guard,
        has_stored_session: layout.credentials_file().exists(),
    })
}

pub fn acquire_session_lock(path: PathBuf) -> Result<SessionLockGuard, AppError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|source| AppError::SessionLockCreate {
            path: path.clone(),
            source,
        })?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(SessionLockGuard { path, file }),
        Err(_) => Err(AppError::SessionStoreBusy { path }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> (tempfile::TempDir, StorageLayout) {
        let root = tempfile::tempdir().expect("temp dir");
        let layout = StorageLayout::under(root.path().join("rmx"));
        (root, layout)
    }

    #[test]
    fn startup_creates_dirs_and_reports_missing_session() {
        let (_root, layout) = layout();

        let plan = plan_startup(&layout).expect("startup plan should be built");

        assert!(layout.session_dir.is_dir());
        assert!(!plan.has_stored_session);
        assert_eq!(plan.lock_guard.path(), layout.session_lock_file());
    }

    #[test]
    fn startup_detects_stored_session() {
        let (_root, layout) = layout();
        layout.ensure_dirs().expect("dirs");
        std::fs::write(layout.credentials_file(), b"{}").expect("credentials fixture");

        let plan = plan_startup(&layout).expect("startup plan should be built");

        assert!(plan.has_stored_session);
    }

    #[test]
    fn second_lock_is_busy_until_first_is_released() {
        let (_root, layout) = layout();
        layout.ensure_dirs().expect("dirs");

        let first = acquire_session_lock(layout.session_lock_file()).expect("first lock");
        let second = acquire_session_lock(layout.session_lock_file());
        assert!(matches!(second, Err(AppError::SessionStoreBusy { .. })));

        drop(first);
        acquire_session_lock(layout.session_lock_file()).expect("lock after release");
    }
}
