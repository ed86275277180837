//! Services driving the explorer: URL caching, preview, bulk export.

mod download;
mod export;
mod preview;
mod url_cache;

pub use download::{DownloadService, DownloadedFile};
pub use export::{ClipboardSink, ExportCoordinator, LinkCopyOutcome, LinkSink};
pub use preview::{DocumentPreview, PreviewService, PreviewStatus};
pub use url_cache::{SignedUrlCache, DEFAULT_URL_TTL};
