//! Filesystem-backed document lookup.

use std::path::{Path, PathBuf};

use syllabus_config::{DocumentIndex, PageRef};

/// Resolves page references against files under the docs source directory.
pub(crate) struct FsDocuments {
    root: PathBuf,
}

impl FsDocuments {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentIndex for FsDocuments {
    fn contains(&self, page: &PageRef) -> bool {
        self.root.join(page.relative_path()).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(path: &str) -> PageRef {
        PageRef::parse(path).unwrap()
    }

    #[test]
    fn test_existing_file_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("11_history_and_evolution")).unwrap();
        std::fs::write(
            dir.path().join("11_history_and_evolution/README.md"),
            "# History",
        )
        .unwrap();
        let documents = FsDocuments::new(dir.path().to_path_buf());

        assert!(documents.contains(&page("/11_history_and_evolution/README.md")));
        assert!(documents.contains(&page("11_history_and_evolution/README.md")));
    }

    #[test]
    fn test_missing_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let documents = FsDocuments::new(dir.path().to_path_buf());

        assert!(!documents.contains(&page("/12_tcp_ip_stack/README.md")));
    }

    #[test]
    fn test_directory_is_not_a_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("notes.md")).unwrap();
        let documents = FsDocuments::new(dir.path().to_path_buf());

        assert!(!documents.contains(&page("/notes.md")));
    }
}
