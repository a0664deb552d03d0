pub mod listing_downloader;
pub mod page_fetcher;

pub use listing_downloader::*;
pub use page_fetcher::*;
