pub mod cli;
pub mod downloader;
pub mod error;
pub mod file_manager;
pub mod html_parser;
pub mod metadata;
pub mod mirror;
pub mod resolver;
pub mod rewriter;
pub mod telemetry;
pub mod transport;

// Re-export main types for convenience
pub use cli::MirrorCommand;
pub use downloader::{AssetFetcher, LocalAsset};
pub use error::{FetchError, PageError, Stage, TransportError};
pub use file_manager::FileManager;
pub use html_parser::{Element, HtmlDocument};
pub use metadata::PageMetadata;
pub use mirror::{BatchSummary, MetadataFormat, Mirror, MirrorConfig, MirrorOutcome, PageJob};
pub use resolver::resolve;
pub use rewriter::{AssetKind, AssetReference, DocumentRewriter, RewriteSummary};
pub use transport::{HttpTransport, Transport};
