use std::io;
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;

use crate::resolver;

/// Decides where mirrored pages and their assets live on disk.
#[derive(Debug, Clone)]
pub struct FileManager {
    output_dir: PathBuf,
    assets_dir: PathBuf,
    isolate_pages: bool,
}

impl FileManager {
    pub fn new(output_dir: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            assets_dir: assets_dir.into(),
            isolate_pages: false,
        }
    }

    /// Give every page its own asset subdirectory keyed by a hash of its URL.
    pub fn isolate_pages(mut self, isolate: bool) -> Self {
        self.isolate_pages = isolate;
        self
    }

    /// `<output_dir>/<url without scheme>.html`. Root, `.` and `..`
    /// components are dropped so the page always lands under `output_dir`.
    pub fn mirror_path(&self, url: &str) -> PathBuf {
        let name = format!("{}.html", resolver::strip_scheme(url));
        let relative: PathBuf = Path::new(&name)
            .components()
            .filter(|component| matches!(component, Component::Normal(_)))
            .collect();
        self.output_dir.join(relative)
    }

    /// Asset directory for one page. Shared by every page unless isolation is
    /// switched on.
    pub fn asset_dir(&self, url: &str) -> PathBuf {
        if !self.isolate_pages {
            return self.assets_dir.clone();
        }

        let digest = Sha256::digest(url.as_bytes());
        self.assets_dir.join(&hex::encode(digest)[..16])
    }

    pub async fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir).await
    }

    /// Writes `content` to `path`, creating parent directories first.
    pub async fn save_file(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content).await
    }
}
