// src/kitchen/layout.rs

//! Folder layout of a cook inside the work directory
//!
//! ```text
//! <work>/<name>-<version>/
//!   source_subfolder/            sources, shared by all configurations
//!   build/<package_id>/          CMake build tree of one configuration
//!   build/<package_id>/generators/
//!   test_package/<package_id>/   build tree of the test consumer
//! ```

use crate::recipe::PackageReference;
use std::path::{Path, PathBuf};

/// Name of the folder holding the checked out sources
pub const SOURCE_SUBFOLDER: &str = "source_subfolder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub source_folder: PathBuf,
    pub build_folder: PathBuf,
    pub generators_folder: PathBuf,
    pub test_folder: PathBuf,
}

impl Layout {
    pub fn new(work_dir: &Path, reference: &PackageReference, package_id: &str) -> Self {
        let root = work_dir.join(format!("{}-{}", reference.name, reference.version));
        let build_folder = root.join("build").join(package_id);
        Self {
            source_folder: root.join(SOURCE_SUBFOLDER),
            generators_folder: build_folder.join("generators"),
            test_folder: root.join("test_package").join(package_id),
            build_folder,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let reference = PackageReference::new("magnum-integration", "2020.06");
        let layout = Layout::new(Path::new("/work"), &reference, "0123456789abcdef");

        assert_eq!(layout.root, PathBuf::from("/work/magnum-integration-2020.06"));
        assert_eq!(
            layout.source_folder,
            PathBuf::from("/work/magnum-integration-2020.06/source_subfolder")
        );
        assert_eq!(
            layout.generators_folder,
            PathBuf::from("/work/magnum-integration-2020.06/build/0123456789abcdef/generators")
        );
        assert_eq!(
            layout.test_folder,
            PathBuf::from("/work/magnum-integration-2020.06/test_package/0123456789abcdef")
        );
    }
}
