use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use colored::*;
use tracing::{info, info_span, warn, Instrument};

use crate::downloader::AssetFetcher;
use crate::error::{PageError, Stage};
use crate::file_manager::FileManager;
use crate::html_parser::HtmlDocument;
use crate::metadata::{self, PageMetadata};
use crate::rewriter::{DocumentRewriter, RewriteSummary};
use crate::transport::{self, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MetadataFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub assets_dir: PathBuf,
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub isolate_pages: bool,
    pub relative_links: bool,
    pub report_metadata: bool,
    pub metadata_format: MetadataFormat,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            output_dir: PathBuf::from("."),
            concurrency: 8,
            timeout: Duration::from_secs(30),
            user_agent: "PageMirror/1.0".to_string(),
            isolate_pages: false,
            relative_links: false,
            report_metadata: true,
            metadata_format: MetadataFormat::Text,
        }
    }
}

/// One input URL and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageJob {
    pub url: String,
    pub save_dir: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOutcome {
    pub job: PageJob,
    pub assets: RewriteSummary,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub mirrored: usize,
    pub failed: Vec<String>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Mirror {
    config: MirrorConfig,
    transport: Arc<dyn Transport>,
    files: FileManager,
    rewriter: DocumentRewriter,
}

impl Mirror {
    pub fn new(config: MirrorConfig, transport: Arc<dyn Transport>) -> Self {
        let files = FileManager::new(&config.output_dir, &config.assets_dir).isolate_pages(config.isolate_pages);
        let rewriter = DocumentRewriter::new(AssetFetcher::new(transport.clone()), config.concurrency);

        Self {
            config,
            transport,
            files,
            rewriter,
        }
    }

    pub fn job(&self, url: &str) -> PageJob {
        PageJob {
            url: url.to_string(),
            save_dir: self.files.asset_dir(url),
            output_path: self.files.mirror_path(url),
        }
    }

    /// Fetch, parse, download assets, rewrite, save.
    pub async fn mirror(&self, url: &str) -> Result<MirrorOutcome, PageError> {
        let job = self.job(url);
        let io_error = |stage, path: &PathBuf| {
            let path = path.clone();
            move |source| PageError::Io {
                url: url.to_string(),
                stage,
                path,
                source,
            }
        };

        let content = transport::get_bytes(self.transport.as_ref(), url)
            .await
            .map_err(|source| PageError::Network {
                url: url.to_string(),
                source,
            })?;

        let doc = HtmlDocument::parse(&content).map_err(|source| PageError::Parse {
            url: url.to_string(),
            source,
        })?;

        self.files
            .ensure_dir(&job.save_dir)
            .await
            .map_err(io_error(Stage::CreateDir, &job.save_dir))?;

        let rewriter = match job.output_path.parent() {
            Some(page_dir) if self.config.relative_links => self.rewriter.clone().with_link_base(page_dir),
            _ => self.rewriter.clone(),
        };
        let assets = rewriter.rewrite_assets(&doc, url, &job.save_dir).await;

        let html = doc
            .to_html()
            .map_err(io_error(Stage::Serialize, &job.output_path))?;

        self.files
            .save_file(&job.output_path, &html)
            .await
            .map_err(io_error(Stage::Persist, &job.output_path))?;

        println!(
            "{} {}",
            "✅ Successfully saved mirrored HTML".green(),
            job.output_path.display()
        );
        info!(
            url,
            rewritten = assets.rewritten,
            failed = assets.failed,
            skipped = assets.skipped,
            "page mirrored"
        );

        Ok(MirrorOutcome { job, assets })
    }

    pub async fn report(&self, url: &str) -> Result<PageMetadata, PageError> {
        metadata::report(self.transport.as_ref(), url).await
    }

    /// Mirrors each URL in order, then reports its metadata. Errors are
    /// printed and the batch moves on.
    pub async fn run(&self, urls: &[String]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for url in urls {
            let span = info_span!("page", url = %url);
            let ok = self.process(url).instrument(span).await;
            if ok {
                summary.mirrored += 1;
            } else {
                summary.failed.push(url.clone());
            }
        }

        info!(mirrored = summary.mirrored, failed = summary.failed.len(), "batch finished");
        summary
    }

    async fn process(&self, url: &str) -> bool {
        let mut ok = true;

        if let Err(e) = self.mirror(url).await {
            Self::print_failure(&e);
            ok = false;
        }

        if self.config.report_metadata {
            match self.report(url).await {
                Ok(metadata) => self.print_metadata(&metadata),
                Err(e) => {
                    Self::print_failure(&e);
                    ok = false;
                }
            }
        }

        ok
    }

    fn print_failure(e: &PageError) {
        warn!(url = e.url(), stage = %e.stage(), "page failed");
        eprintln!("{} {}", "❌".red(), e);
    }

    fn print_metadata(&self, metadata: &PageMetadata) {
        match self.config.metadata_format {
            MetadataFormat::Text => println!("{}", metadata),
            MetadataFormat::Json => match serde_json::to_string(metadata) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("{} failed to encode metadata for {}: {}", "❌".red(), metadata.site, e),
            },
        }
    }
}
