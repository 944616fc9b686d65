use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::*;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::FetchError;
use crate::resolver;
use crate::transport::Transport;

/// A successfully downloaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    pub path: PathBuf,
    /// Last path segment of the URL the asset was fetched from.
    pub file_name: String,
}

impl LocalAsset {
    /// The asset path as it should appear in an HTML attribute.
    pub fn link(&self) -> String {
        path_to_link(&self.path)
    }
}

pub(crate) fn path_to_link(path: &Path) -> String {
    path.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/")
}

/// Downloads resolved asset URLs into a save directory.
#[derive(Clone)]
pub struct AssetFetcher {
    transport: Arc<dyn Transport>,
}

impl AssetFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Streams `resolved_url` into `save_dir/<last path segment>`.
    ///
    /// An existing file with the same name is truncated. If the write fails
    /// partway the partial file stays on disk.
    pub async fn fetch(&self, resolved_url: &str, save_dir: &Path) -> Result<LocalAsset, FetchError> {
        let network = |source| FetchError::Network {
            url: resolved_url.to_string(),
            source,
        };

        let mut body = self.transport.get(resolved_url).await.map_err(network)?;

        let file_name = resolver::file_name(resolved_url).to_string();
        let path = save_dir.join(&file_name);
        let io = |source| FetchError::Io {
            path: path.clone(),
            source,
        };

        let mut file = File::create(&path).await.map_err(io)?;
        let copied: Result<(), FetchError> = async {
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(network)?;
                file.write_all(&chunk).await.map_err(io)?;
            }
            Ok(())
        }
        .await;

        // tokio::fs::File writes in the background. Flush on failure too so no
        // chunk lands after a later download of the same name.
        let flushed = file.flush().await.map_err(io);
        copied?;
        flushed?;

        println!("{} {}", "📥 Downloaded asset:".green(), path.display());
        Ok(LocalAsset { path, file_name })
    }
}
