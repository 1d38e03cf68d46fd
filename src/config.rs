//! On-disk layout for downloaded and extracted datasets.

use std::path::{Path, PathBuf};

/// Directory pair for dataset storage: raw archives land under
/// `external`, extracted trees under `processed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataDirs {
    pub external: PathBuf,
    pub processed: PathBuf,
}

impl DataDirs {
    /// Derive the standard layout beneath a single data root.
    pub fn under(root: &Path) -> Self {
        Self {
            external: root.join("external"),
            processed: root.join("processed"),
        }
    }

    /// Staging path for a dataset's downloaded archive.
    pub fn archive_path(&self, dataset: &str) -> PathBuf {
        self.external.join(format!("{dataset}.zip"))
    }

    /// Extraction target for a dataset's directory tree.
    pub fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.processed.join(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_derived_from_root() {
        let dirs = DataDirs::under(Path::new("data"));
        assert_eq!(dirs.archive_path("raspberryset"), Path::new("data/external/raspberryset.zip"));
        assert_eq!(dirs.dataset_dir("raspberryset"), Path::new("data/processed/raspberryset"));
    }
}
