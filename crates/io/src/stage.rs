//! Staging directories: fill `<target>.staging`, then swap it over `<target>`.
//!
//! A [`StagedDir`] that is dropped without [`StagedDir::commit`] removes its
//! staging directory, so an aborted run leaves the target untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// `<dir>.staging`, next to `dir` so the final rename stays on one filesystem.
pub fn staging_path(dir: &Path) -> PathBuf {
    let mut name = dir.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".staging");
    dir.with_file_name(name)
}

#[derive(Debug)]
pub struct StagedDir {
    target: PathBuf,
    staging: PathBuf,
    committed: bool,
}

impl StagedDir {
    /// Start an empty staging directory for `target`, discarding an abandoned one.
    pub fn create(target: &Path) -> io::Result<Self> {
        let staging = staging_path(target);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;
        Ok(Self {
            target: target.to_path_buf(),
            staging,
            committed: false,
        })
    }

    /// Where content goes until commit.
    pub fn path(&self) -> &Path {
        &self.staging
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Replace `target` with the staged content.
    pub fn commit(mut self) -> io::Result<()> {
        if self.target.is_dir() {
            fs::remove_dir_all(&self.target)?;
        } else if self.target.exists() {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "exists and is not a directory"));
        }
        fs::rename(&self.staging, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedDir {
    fn drop(&mut self) {
        if self.committed || !self.staging.exists() {
            return;
        }
        match fs::remove_dir_all(&self.staging) {
            Ok(()) => log::debug!("discarded {}", self.staging.display()),
            Err(e) => log::warn!("could not remove {}: {}", self.staging.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_replaces_target() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("out");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("stale.csv"), "old").unwrap();

        let stage = StagedDir::create(&target).unwrap();
        fs::write(stage.path().join("RESTOS_PAGAR.csv"), "new").unwrap();
        assert!(target.join("stale.csv").exists());
        stage.commit().unwrap();

        assert!(!target.join("stale.csv").exists());
        assert_eq!(fs::read_to_string(target.join("RESTOS_PAGAR.csv")).unwrap(), "new");
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn dropped_stage_leaves_target_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested/out");
        {
            let stage = StagedDir::create(&target).unwrap();
            fs::write(stage.path().join("EMPENHO.json"), "[]").unwrap();
        }
        assert!(!target.exists());
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn commit_over_a_file_fails_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("out");
        fs::write(&target, "not a directory").unwrap();

        let stage = StagedDir::create(&target).unwrap();
        assert!(stage.commit().is_err());
        assert!(target.is_file());
        assert!(!staging_path(&target).exists());
    }
}
