//! Stem-scoped artifact bookkeeping
//!
//! Every file the pipeline derives from a scan is named `{stem}_final…` or
//! `{stem}_resampled…`. Matching on that prefix keeps `sub1` from claiming
//! the artifacts of `sub10`. Stems that extend another with an underscore
//! (`sub1` and `sub1_final`) overlap on the prefix, so a matcher also
//! rejects names that belong to a longer known stem.

use crate::error::{Result, TaebsmError};
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Matches the artifact files of one scan
#[derive(Debug, Clone)]
pub struct ArtifactMatcher {
    stem: String,
    regex: Regex,
    claimed: Vec<Regex>,
}

impl ArtifactMatcher {
    /// Creates a matcher for the artifacts of `stem`
    pub fn new(stem: &str) -> Result<Self> {
        Ok(Self {
            stem: stem.to_string(),
            regex: artifact_regex(stem)?,
            claimed: Vec::new(),
        })
    }

    /// Leaves out files owned by any of `stems` that extends this one
    pub fn excluding<S: AsRef<str>>(mut self, stems: &[S]) -> Result<Self> {
        let prefix = format!("{}_", self.stem);
        for other in stems {
            let other = other.as_ref();
            if other.starts_with(&prefix) {
                self.claimed.push(artifact_regex(other)?);
            }
        }
        Ok(self)
    }

    /// Checks a file name against the stem
    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name) && !self.claimed.iter().any(|r| r.is_match(file_name))
    }

    /// Files in `dir` belonging to the stem, sorted; a missing directory has none
    pub fn find_in(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if entry.path().is_file() && self.matches(&name.to_string_lossy()) {
                found.push(entry.path());
            }
        }
        found.sort();
        Ok(found)
    }

    /// Removes every file in `dir` belonging to the stem, returning how many went
    pub fn remove_from(&self, dir: &Path) -> Result<usize> {
        let found = self.find_in(dir)?;
        for path in &found {
            fs::remove_file(path)?;
            debug!("Removed {}", path.display());
        }
        Ok(found.len())
    }
}

fn artifact_regex(stem: &str) -> Result<Regex> {
    let pattern = format!(r"^{}_(?:final|resampled)", regex::escape(stem));
    Regex::new(&pattern).map_err(|e| TaebsmError::InvalidInput(format!("stem {:?}: {}", stem, e)))
}

/// Removes a file if it exists
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Moves a file, falling back to copy-and-delete across filesystems
///
/// # Errors
///
/// Returns `AlreadyExists` if `to` is taken
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        )
        .into());
    }
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}

/// A free path for `file_name` in `dir`
///
/// Taken names get a counter after the stem: `sub01.nii.gz`, then
/// `sub01-1.nii.gz`, `sub01-2.nii.gz`.
pub fn unused_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, rest) = match file_name.find('.') {
        Some(i) => file_name.split_at(i),
        None => (file_name, ""),
    };
    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{}-{}{}", stem, n, rest));
        if !candidate.exists() {
            warn!(
                "{} already in {}, using {}",
                file_name,
                dir.display(),
                candidate.display()
            );
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            File::create(dir.join(name)).unwrap();
        }
    }

    #[test]
    fn test_matches_only_own_stem() {
        let matcher = ArtifactMatcher::new("sub1").unwrap();
        assert!(matcher.matches("sub1_final.nii.gz"));
        assert!(matcher.matches("sub1_final_mask.nii.gz"));
        assert!(matcher.matches("sub1_final.mat"));
        assert!(matcher.matches("sub1_resampled.nii.gz"));
        assert!(!matcher.matches("sub10_final.nii.gz"));
        assert!(!matcher.matches("sub1_b_final.nii.gz"));
        assert!(!matcher.matches("xsub1_final.nii.gz"));
    }

    #[test]
    fn test_longer_stem_keeps_its_artifacts() {
        let matcher = ArtifactMatcher::new("sub1")
            .unwrap()
            .excluding(&["sub1", "sub1_final", "sub1_b", "sub2"])
            .unwrap();

        assert!(matcher.matches("sub1_final.nii.gz"));
        assert!(matcher.matches("sub1_final_mask.nii.gz"));
        assert!(matcher.matches("sub1_final.mat"));
        assert!(!matcher.matches("sub1_final_final.nii.gz"));
        assert!(!matcher.matches("sub1_final_final_mask.nii.gz"));
        assert!(!matcher.matches("sub1_final_final.mat"));
        assert!(!matcher.matches("sub1_final_resampled.nii.gz"));
    }

    #[test]
    fn test_stem_is_escaped() {
        let matcher = ArtifactMatcher::new("a+b(1)").unwrap();
        assert!(matcher.matches("a+b(1)_final.nii.gz"));
        assert!(!matcher.matches("aab1_final.nii.gz"));
    }

    #[test]
    fn test_find_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        touch(
            temp_dir.path(),
            &[
                "sub1_final.nii.gz",
                "sub1_final_mask.nii.gz",
                "sub1_final_skull.nii.gz",
                "sub2_final.nii.gz",
            ],
        );

        let matcher = ArtifactMatcher::new("sub1").unwrap();
        assert_eq!(matcher.find_in(temp_dir.path()).unwrap().len(), 3);
        assert_eq!(matcher.remove_from(temp_dir.path()).unwrap(), 3);
        assert!(matcher.find_in(temp_dir.path()).unwrap().is_empty());
        assert!(temp_dir.path().join("sub2_final.nii.gz").is_file());
    }

    #[test]
    fn test_find_in_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let matcher = ArtifactMatcher::new("sub1").unwrap();
        assert!(matcher
            .find_in(&temp_dir.path().join("missing"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_remove_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mask.nii.gz");
        File::create(&path).unwrap();

        assert!(remove_if_exists(&path).unwrap());
        assert!(!remove_if_exists(&path).unwrap());
    }

    #[test]
    fn test_move_file() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("scan.nii.gz");
        fs::write(&from, b"volume").unwrap();
        let to_dir = temp_dir.path().join("exceptions");
        fs::create_dir(&to_dir).unwrap();
        let to = to_dir.join("scan.nii.gz");

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"volume");
    }

    #[test]
    fn test_move_file_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("new.nii.gz");
        let to = temp_dir.path().join("old.nii.gz");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"old").unwrap();

        assert!(move_file(&from, &to).is_err());
        assert_eq!(fs::read(&to).unwrap(), b"old");
        assert!(from.exists());
    }

    #[test]
    fn test_unused_destination() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        assert_eq!(unused_destination(dir, "sub01.nii.gz"), dir.join("sub01.nii.gz"));
        touch(dir, &["sub01.nii.gz", "sub01-1.nii.gz", "notes"]);
        assert_eq!(unused_destination(dir, "sub01.nii.gz"), dir.join("sub01-2.nii.gz"));
        assert_eq!(unused_destination(dir, "notes"), dir.join("notes-1"));
    }
}
