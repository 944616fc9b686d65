use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::downloader::{path_to_link, AssetFetcher, LocalAsset};
use crate::error::FetchError;
use crate::html_parser::{Element, HtmlDocument};
use crate::resolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Stylesheet,
    Script,
}

impl AssetKind {
    /// Discovery order: every image, then every stylesheet, then every script.
    pub const ALL: [AssetKind; 3] = [AssetKind::Image, AssetKind::Stylesheet, AssetKind::Script];

    /// The attribute carrying the reference.
    pub fn attribute(self) -> &'static str {
        match self {
            AssetKind::Image | AssetKind::Script => "src",
            AssetKind::Stylesheet => "href",
        }
    }

    fn matches(self, element: &Element) -> bool {
        match self {
            AssetKind::Image => element.is("img") && element.has_attr("src"),
            AssetKind::Script => element.is("script") && element.has_attr("src"),
            AssetKind::Stylesheet => {
                element.is("link")
                    && element.has_attr("href")
                    && element.attr("rel").is_some_and(|rel| {
                        rel.split_ascii_whitespace()
                            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
                    })
            }
        }
    }
}

/// A reference to an external resource, tied to the element that holds it.
#[derive(Clone)]
pub struct AssetReference {
    pub kind: AssetKind,
    /// Attribute value exactly as found in the document.
    pub raw: String,
    element: Element,
}

impl AssetReference {
    fn rewrite(&self, value: &str) -> bool {
        self.element.set_attr(self.kind.attribute(), value)
    }
}

/// Finds every asset reference in class-major order, document order within a
/// class. Empty attribute values are included.
pub fn discover(doc: &HtmlDocument) -> Vec<AssetReference> {
    AssetKind::ALL
        .iter()
        .flat_map(|&kind| {
            doc.select(|element| kind.matches(element))
                .into_iter()
                .map(move |element| AssetReference {
                    kind,
                    raw: element.attr(kind.attribute()).unwrap_or_default(),
                    element,
                })
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteSummary {
    pub discovered: usize,
    /// References with an empty value; never fetched.
    pub skipped: usize,
    pub rewritten: usize,
    /// References left pointing at the remote resource.
    pub failed: usize,
}

/// Downloads every asset a page references and points the page at the local
/// copies.
#[derive(Clone)]
pub struct DocumentRewriter {
    fetcher: AssetFetcher,
    concurrency: usize,
    link_base: Option<PathBuf>,
}

impl DocumentRewriter {
    pub fn new(fetcher: AssetFetcher, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
            link_base: None,
        }
    }

    /// Write links relative to `dir` (the directory of the saved page)
    /// instead of the raw asset path.
    pub fn with_link_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.link_base = Some(dir.into());
        self
    }

    pub async fn rewrite_assets(&self, doc: &HtmlDocument, base_url: &str, save_dir: &Path) -> RewriteSummary {
        let references = discover(doc);
        let mut summary = RewriteSummary {
            discovered: references.len(),
            ..Default::default()
        };

        let resolved: Vec<Option<String>> = references
            .iter()
            .map(|reference| {
                (!reference.raw.is_empty()).then(|| resolver::resolve(base_url, &reference.raw))
            })
            .collect();

        let results = self.fetch_all(plan(&resolved), save_dir).await;

        for (reference, url) in references.iter().zip(&resolved) {
            let Some(url) = url else {
                summary.skipped += 1;
                continue;
            };

            match results.get(url) {
                Some(Ok(asset)) => {
                    if reference.rewrite(&self.link_for(asset)) {
                        summary.rewritten += 1;
                    } else {
                        summary.failed += 1;
                    }
                }
                Some(Err(e)) => {
                    warn!(url = %url, error = %e, "keeping remote reference");
                    summary.failed += 1;
                }
                None => summary.failed += 1,
            }
        }

        debug!(?summary, base_url, "rewrite finished");
        summary
    }

    async fn fetch_all(
        &self,
        groups: Vec<Vec<String>>,
        save_dir: &Path,
    ) -> HashMap<String, Result<LocalAsset, FetchError>> {
        stream::iter(groups)
            .map(|urls| async move {
                let mut results = Vec::with_capacity(urls.len());
                for url in urls {
                    let result = self.fetcher.fetch(&url, save_dir).await;
                    results.push((url, result));
                }
                results
            })
            .buffer_unordered(self.concurrency)
            .flat_map(stream::iter)
            .collect()
            .await
    }

    fn link_for(&self, asset: &LocalAsset) -> String {
        let Some(base) = &self.link_base else {
            return asset.link();
        };

        match pathdiff::diff_paths(normalize(&asset.path), normalize(base)) {
            Some(relative) => path_to_link(&relative),
            None => asset.link(),
        }
    }
}

/// Groups unique URLs by target file name, keeping first-seen order. Groups
/// run concurrently; URLs inside one group run in order, so the last one
/// written wins deterministically.
fn plan(resolved: &[Option<String>]) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();

    for url in resolved.iter().flatten() {
        let idx = *by_name.entry(resolver::file_name(url)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        if !groups[idx].contains(url) {
            groups[idx].push(url.clone());
        }
    }

    groups
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}
