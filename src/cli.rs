use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::mirror::{MetadataFormat, MirrorConfig};

#[derive(Parser, Debug)]
#[command(
    name = "page-mirror",
    about = "A CLI utility to mirror web pages together with their images, stylesheets and scripts",
    version,
    long_about = "Downloads each page, saves every referenced image, stylesheet and script into a local asset directory, rewrites the page to point at the local copies and prints a short metadata summary per page."
)]
pub struct MirrorCommand {
    /// The URLs of the pages to mirror, processed in order
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Directory receiving downloaded assets
    #[arg(short, long, default_value = "assets")]
    pub assets_dir: PathBuf,

    /// Directory receiving the mirrored HTML files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum concurrent asset downloads per page
    #[arg(short = 'c', long, default_value = "8", value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Timeout for requests in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// User agent string to use for requests
    #[arg(long, default_value = "PageMirror/1.0")]
    pub user_agent: String,

    /// Store each page's assets in its own subdirectory of the asset directory
    #[arg(long)]
    pub isolate_pages: bool,

    /// Rewrite references relative to the mirrored HTML file instead of the working directory
    #[arg(long)]
    pub relative_links: bool,

    /// Skip the metadata summary
    #[arg(long)]
    pub no_metadata: bool,

    /// Output format of the metadata summary
    #[arg(long, value_enum, default_value_t = MetadataFormat::Text)]
    pub metadata_format: MetadataFormat,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl MirrorCommand {
    pub fn to_config(&self) -> MirrorConfig {
        MirrorConfig {
            assets_dir: self.assets_dir.clone(),
            output_dir: self.output_dir.clone(),
            concurrency: usize::from(self.concurrency),
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
            isolate_pages: self.isolate_pages,
            relative_links: self.relative_links,
            report_metadata: !self.no_metadata,
            metadata_format: self.metadata_format,
        }
    }
}
