//! File-per-page storage under a run's output directory

use crate::storage::paths::filename_for_url;
use crate::storage::traits::{PageMetadata, PageStore, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes one markdown document per page into a single directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `root`, creating the directory if needed
    pub fn create(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the page for `url` is (or would be) stored at
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(filename_for_url(url))
    }
}

/// Renders the stored document: a metadata header followed by the page text
pub fn render_page(url: &str, content: &str, metadata: &PageMetadata) -> String {
    format!(
        "# {}\n\n**URL:** {}\n\n**Depth:** {}\n\n**Crawled at:** {}\n\n---\n\n{}\n",
        metadata.title,
        url,
        metadata.depth,
        metadata.crawled_at.to_rfc3339(),
        content
    )
}

impl PageStore for FileStore {
    fn exists(&self, url: &str) -> bool {
        self.path_for(url).is_file()
    }

    fn save(&self, url: &str, content: &str, metadata: &PageMetadata) -> StorageResult<String> {
        let filename = filename_for_url(url);
        let path = self.root.join(&filename);
        fs::write(&path, render_page(url, content, metadata))?;
        tracing::debug!("Saved {} to {}", url, path.display());
        Ok(filename)
    }
}
