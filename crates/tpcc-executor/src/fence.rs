//! Outer transactional boundary around each attempt.

use crate::error::FenceError;
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::Path;
use tracing::debug;

/// A collaborator-provided transaction wrapping every backend attempt.
///
/// The executor calls `begin` before the attempt, `commit` after it succeeds
/// and `abort` after aborting the backend when it fails.
pub trait Fence {
    fn begin(&mut self) -> Result<(), FenceError>;
    fn commit(&mut self) -> Result<(), FenceError>;
    fn abort(&mut self) -> Result<(), FenceError>;
}

impl<F: Fence + ?Sized> Fence for Box<F> {
    fn begin(&mut self) -> Result<(), FenceError> {
        (**self).begin()
    }

    fn commit(&mut self) -> Result<(), FenceError> {
        (**self).commit()
    }

    fn abort(&mut self) -> Result<(), FenceError> {
        (**self).abort()
    }
}

mod ioctl {
    nix::ioctl_none_bad!(fence_begin, 0xCF00_0001_u32);
    nix::ioctl_none_bad!(fence_commit, 0xCF00_0002_u32);
    nix::ioctl_none_bad!(fence_abort, 0xCF00_0003_u32);
}

/// Fence driven by ioctls on a transactional filesystem's control file.
#[derive(Debug)]
pub struct IoctlFence {
    file: File,
}

impl IoctlFence {
    /// Open the control file under `mount`.
    pub fn open(mount: impl AsRef<Path>) -> Result<Self, FenceError> {
        let path = mount.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| FenceError::Open {
                path: path.display().to_string(),
                source,
            })?;
        debug!("Opened fence control file {}", path.display());
        Ok(Self { file })
    }
}

impl Fence for IoctlFence {
    fn begin(&mut self) -> Result<(), FenceError> {
        // SAFETY: the request takes no argument and the descriptor is owned by `self`.
        unsafe { ioctl::fence_begin(self.file.as_raw_fd()) }
            .map(|_| ())
            .map_err(|source| FenceError::Ioctl {
                operation: "begin",
                source,
            })
    }

    fn commit(&mut self) -> Result<(), FenceError> {
        // SAFETY: as above.
        unsafe { ioctl::fence_commit(self.file.as_raw_fd()) }
            .map(|_| ())
            .map_err(|source| FenceError::Ioctl {
                operation: "commit",
                source,
            })
    }

    fn abort(&mut self) -> Result<(), FenceError> {
        // SAFETY: as above.
        unsafe { ioctl::fence_abort(self.file.as_raw_fd()) }
            .map(|_| ())
            .map_err(|source| FenceError::Ioctl {
                operation: "abort",
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_control_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = IoctlFence::open(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, FenceError::Open { .. }));
    }

    #[test]
    fn test_ioctl_on_regular_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut fence = IoctlFence::open(file.path()).unwrap();
        let err = fence.begin().unwrap_err();
        assert!(matches!(
            err,
            FenceError::Ioctl {
                operation: "begin",
                ..
            }
        ));
    }
}
