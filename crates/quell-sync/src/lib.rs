//! Cross-worker reconciliation over a shared, advisory-locked file.
//!
//! Each worker in a parallel scan owns a disjoint subset of files, so no
//! single worker can say which suppressions went unmatched *everywhere*.
//! The parent creates one [`SyncFile`] before spawning workers; every
//! worker folds its remaining ledger into it on completion under an
//! exclusive `flock`, and the designated reporter polls until all of its
//! siblings have reported, then reads the reconciled result.
//!
//! The merge is a key-intersection: a file belongs to exactly one worker,
//! so an entry missing from the current worker's remaining ledger was
//! fully resolved by its owner and must not survive the merge. See
//! [`quell_ledger::Ledger::intersect`].
//!
//! Poll reads deliberately take no lock. Content that is unreadable or
//! corrupt mid-write is a transient miss retried on the next tick; once
//! every sibling has reported no writer remains, so the final read is
//! stable.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quell_ledger::Ledger;

/// Sleep between unlocked poll reads while waiting for sibling workers.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Total wait ceiling before a poll fails fatally.
pub const WAIT_CEILING: Duration = Duration::from_secs(30);

/// Errors from shared-file reconciliation.
///
/// During the poll loop, I/O and corrupt-content failures are handled
/// internally as transient; the only errors surfacing from
/// [`SyncFile::await_peers`] are [`SyncError::Timeout`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to access reconciliation file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to acquire an exclusive lock on file '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Reconciliation file '{path}' holds corrupt data: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Waiting time for all workers to complete - {} seconds - exceeded \
         (pid {own_pid}, parent pid {parent_pid}, parent alive: {parent_alive})",
        ceiling.as_secs()
    )]
    Timeout {
        ceiling: Duration,
        own_pid: u32,
        parent_pid: u32,
        parent_alive: bool,
    },
}

/// Wire shape of the reconciliation file.
///
/// `remaining` starts as the `null` sentinel; the first completer stores
/// its ledger verbatim and later completers intersect into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedState {
    pub process_count: u32,
    pub completed_count: u32,
    pub remaining: Option<Ledger>,
}

/// Handle on the shared reconciliation file and its lock-file sibling.
#[derive(Debug, Clone)]
pub struct SyncFile {
    data_path: PathBuf,
}

impl SyncFile {
    /// Create the shared file, initialized to the sentinel state for
    /// `process_count` workers. The parent calls this before spawning.
    pub fn create(data_path: PathBuf, process_count: u32) -> Result<Self, SyncError> {
        let sync = Self::at(data_path);
        sync.store(&SharedState {
            process_count,
            completed_count: 0,
            remaining: None,
        })?;
        Ok(sync)
    }

    /// Handle on an existing shared file, in a worker that received the
    /// path from its parent.
    #[must_use]
    pub fn at(data_path: PathBuf) -> Self {
        Self { data_path }
    }

    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        let mut os = self.data_path.clone().into_os_string();
        os.push(".lock");
        PathBuf::from(os)
    }

    /// Fold one worker's remaining ledger into the shared state, under an
    /// exclusive lock on the lock-file sibling (blocking wait; writes are
    /// brief).
    ///
    /// A missing data file means the designated reporter has already read
    /// and discarded the state; the merge is skipped.
    pub fn report_completion(&self, remaining: &Ledger) -> Result<(), SyncError> {
        if !self.data_path.exists() {
            return Ok(());
        }

        let _guard = LockGuard::acquire(&self.lock_path())?;

        let mut state = self.load()?;
        state.completed_count += 1;
        state.remaining = Some(match state.remaining.take() {
            None => remaining.clone(),
            Some(stored) => stored.intersect(remaining),
        });
        self.store(&state)
    }

    /// Poll until every sibling worker has reported, then return the
    /// reconciled ledger (the stored state intersected with the caller's
    /// own remaining ledger). Uses the default [`WAIT_CEILING`].
    pub fn await_peers(&self, remaining: &Ledger) -> Result<Ledger, SyncError> {
        self.await_peers_with(remaining, WAIT_CEILING)
    }

    /// [`SyncFile::await_peers`] with an explicit ceiling.
    ///
    /// The caller is the one worker that has not reported yet, so
    /// completion is `process_count == completed_count + 1`.
    pub fn await_peers_with(
        &self,
        remaining: &Ledger,
        ceiling: Duration,
    ) -> Result<Ledger, SyncError> {
        let start = Instant::now();
        loop {
            // unlocked read; failures race an in-flight write and retry
            if let Ok(state) = self.load()
                && state.process_count == state.completed_count + 1
            {
                let stored = state.remaining.unwrap_or_default();
                return Ok(stored.intersect(remaining));
            }

            if start.elapsed() > ceiling {
                let parent_pid = parent_pid();
                return Err(SyncError::Timeout {
                    ceiling,
                    own_pid: std::process::id(),
                    parent_pid,
                    parent_alive: is_pid_alive(parent_pid),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Delete the data file and its lock sibling. Called by the final
    /// consumer; both may already be gone.
    pub fn cleanup(&self) -> Result<(), SyncError> {
        for path in [self.data_path.clone(), self.lock_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(SyncError::Io { path, source }),
            }
        }
        Ok(())
    }

    fn load(&self) -> Result<SharedState, SyncError> {
        let content = fs::read_to_string(&self.data_path).map_err(|source| SyncError::Io {
            path: self.data_path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SyncError::Corrupt {
            path: self.data_path.clone(),
            source,
        })
    }

    fn store(&self, state: &SharedState) -> Result<(), SyncError> {
        let json = serde_json::to_string(state).map_err(|source| SyncError::Corrupt {
            path: self.data_path.clone(),
            source,
        })?;
        fs::write(&self.data_path, json).map_err(|source| SyncError::Io {
            path: self.data_path.clone(),
            source,
        })
    }
}

/// RAII guard over an exclusive advisory lock.
///
/// Acquisition blocks until the lock is free; the lock is released on drop
/// (and by the OS when the descriptor closes, should the process die
/// first).
#[derive(Debug)]
pub struct LockGuard {
    file: File,
}

impl LockGuard {
    pub fn acquire(path: &Path) -> Result<Self, SyncError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| SyncError::Lock {
                path: path.to_path_buf(),
                source,
            })?;
        flock_exclusive(&file).map_err(|source| SyncError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            // SAFETY: flock is a standard POSIX call; the fd is owned by
            // `self.file` and stays open for the duration of the call.
            #[allow(unsafe_code)]
            unsafe {
                libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
            }
        }
    }
}

/// Blocking exclusive `flock`, retried on `EINTR`.
#[cfg(unix)]
fn flock_exclusive(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    loop {
        // SAFETY: flock is a standard POSIX call; fd is a valid descriptor
        // owned by `file`. LOCK_EX blocks until the lock is granted.
        #[allow(unsafe_code)]
        let result = unsafe { libc::flock(fd, libc::LOCK_EX) };
        if result == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::EINTR) {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
fn flock_exclusive(_file: &File) -> io::Result<()> {
    // No advisory locking off Unix; reconciliation still works for the
    // common single-writer-at-a-time case.
    Ok(())
}

#[cfg(unix)]
fn parent_pid() -> u32 {
    // SAFETY: getppid has no failure mode and touches no memory.
    #[allow(unsafe_code)]
    let ppid = unsafe { libc::getppid() };
    u32::try_from(ppid).unwrap_or(0)
}

#[cfg(not(unix))]
fn parent_pid() -> u32 {
    0
}

/// `kill(pid, 0)` checks for existence without signaling. `EPERM` means
/// the process exists but is not ours; treat as alive.
#[cfg(unix)]
fn is_pid_alive(pid: u32) -> bool {
    let Ok(pid) = i32::try_from(pid) else {
        return false;
    };
    if pid == 0 {
        return false;
    }
    // SAFETY: kill with signal 0 only checks for process existence.
    #[allow(unsafe_code)]
    let result = unsafe { libc::kill(pid, 0) };
    if result == 0 {
        return true;
    }
    io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn is_pid_alive(_pid: u32) -> bool {
    true
}
