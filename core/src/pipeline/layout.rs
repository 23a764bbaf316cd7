use crate::error::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const INPUT_DIR: &str = "input_files";
pub const OUTPUT_DIR: &str = "output_files";
pub const MATRIX_DIR: &str = "mat_files";
pub const RESAMPLED_DIR: &str = "resampled_files";
pub const VIEWS_DIR: &str = "anatomical_views";
pub const EXCEPTIONS_DIR: &str = "exceptions";

/// Fixed working directories of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub root: PathBuf,
    /// Source volumes
    pub input: PathBuf,
    /// Brain-extracted, registered volumes and transient masks
    pub output: PathBuf,
    /// Registration matrices
    pub matrices: PathBuf,
    /// Transient resampled volumes
    pub resampled: PathBuf,
    /// One sub-directory of view images per scan
    pub views: PathBuf,
    /// Quarantined originals
    pub exceptions: PathBuf,
}

impl WorkspaceLayout {
    /// Lays the working directories out under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            input: root.join(INPUT_DIR),
            output: root.join(OUTPUT_DIR),
            matrices: root.join(MATRIX_DIR),
            resampled: root.join(RESAMPLED_DIR),
            views: root.join(VIEWS_DIR),
            exceptions: root.join(EXCEPTIONS_DIR),
            root,
        }
    }

    /// Every working directory
    pub fn directories(&self) -> [&Path; 6] {
        [
            &self.input,
            &self.output,
            &self.matrices,
            &self.resampled,
            &self.views,
            &self.exceptions,
        ]
    }

    /// Creates missing directories; existing ones and their contents are left alone
    pub fn bootstrap(&self) -> Result<()> {
        for dir in self.directories() {
            if !dir.is_dir() {
                fs::create_dir_all(dir)?;
                info!("Created {}", dir.display());
            }
        }
        Ok(())
    }

    /// Regular, non-hidden files in the input directory, sorted by name
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.input)? {
            let entry = entry?;
            let path = entry.path();

            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if path.is_file() && !hidden {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Names of the per-scan directories under the views directory, sorted
    pub fn view_stems(&self) -> Result<Vec<String>> {
        let mut stems = Vec::new();

        for entry in fs::read_dir(&self.views)? {
            let entry = entry?;
            if entry.path().is_dir() {
                stems.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        stems.sort();
        Ok(stems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = WorkspaceLayout::new("/work");
        assert_eq!(layout.input, PathBuf::from("/work/input_files"));
        assert_eq!(layout.output, PathBuf::from("/work/output_files"));
        assert_eq!(layout.matrices, PathBuf::from("/work/mat_files"));
        assert_eq!(layout.resampled, PathBuf::from("/work/resampled_files"));
        assert_eq!(layout.views, PathBuf::from("/work/anatomical_views"));
        assert_eq!(layout.exceptions, PathBuf::from("/work/exceptions"));
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let layout = WorkspaceLayout::new(temp_dir.path());

        layout.bootstrap().unwrap();
        for dir in layout.directories() {
            assert!(dir.is_dir());
        }

        let kept = layout.output.join("sub01_final.nii.gz");
        File::create(&kept).unwrap();
        let kept_dir = layout.views.join("sub01");
        fs::create_dir(&kept_dir).unwrap();

        layout.bootstrap().unwrap();
        layout.bootstrap().unwrap();
        assert!(kept.is_file());
        assert!(kept_dir.is_dir());
    }

    #[test]
    fn test_input_files_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let layout = WorkspaceLayout::new(temp_dir.path());
        layout.bootstrap().unwrap();

        File::create(layout.input.join("sub03.nii.gz")).unwrap();
        File::create(layout.input.join("sub01.nii.gz")).unwrap();
        File::create(layout.input.join("sub02.nii")).unwrap();
        File::create(layout.input.join(".DS_Store")).unwrap();
        fs::create_dir(layout.input.join("nested")).unwrap();

        let files = layout.input_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["sub01.nii.gz", "sub02.nii", "sub03.nii.gz"]);
    }

    #[test]
    fn test_input_files_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let layout = WorkspaceLayout::new(temp_dir.path().join("nowhere"));
        assert!(layout.input_files().is_err());
    }

    #[test]
    fn test_view_stems() {
        let temp_dir = TempDir::new().unwrap();
        let layout = WorkspaceLayout::new(temp_dir.path());
        layout.bootstrap().unwrap();

        fs::create_dir(layout.views.join("sub02")).unwrap();
        fs::create_dir(layout.views.join("sub01_final")).unwrap();
        File::create(layout.views.join("stray.png")).unwrap();

        assert_eq!(layout.view_stems().unwrap(), vec!["sub01_final", "sub02"]);
    }
}
